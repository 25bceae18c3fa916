use crate::domain::model::SkipReason;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    pub layout: &'static str,
    pub index: usize,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: SkipReason,
}

fn serialize_reason<S: Serializer>(reason: &SkipReason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// 解析與分帳過程的診斷紀錄。由呼叫端傳入，同時轉送到 tracing。
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    skipped: Vec<SkippedEntry>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.push(Severity::Error, message);
    }

    /// 記錄一筆被略過的收據項目 (index 從 0 開始)
    pub fn skip(&mut self, layout: &'static str, index: usize, reason: SkipReason) {
        tracing::warn!(layout, index, %reason, "Skipping receipt entry");
        self.skipped.push(SkippedEntry {
            layout,
            index,
            reason,
        });
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(Diagnostic { severity, message });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_by_severity() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.info("parsed 3 items");
        diagnostics.warn("section missing");
        diagnostics.skip("asda/table", 2, SkipReason::ZeroQuantity);

        assert_eq!(diagnostics.entries().len(), 2);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.skipped()[0].index, 2);
        assert!(!diagnostics.has_errors());

        diagnostics.error("unknown store");
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_skip_reason_serializes_as_text() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.skip("tesco", 0, SkipReason::MissingField("price"));
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["skipped"][0]["reason"], "missing price");
    }
}
