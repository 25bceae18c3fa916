use crate::core::aggregate::aggregate;
use crate::core::assign::resolve_allocations;
use crate::core::receipt::{extract_items_from_html, ParseOptions};
use crate::core::report;
use crate::core::{CanonicalItem, ConfigProvider, Diagnostics, Pipeline, SplitReport, Storage, Store};
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub struct SplitPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SplitPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for SplitPipeline<S, C> {
    fn extract(&self) -> Result<(Vec<CanonicalItem>, Diagnostics)> {
        let store: Store = self.config.store().parse()?;

        tracing::debug!("Reading receipt from: {}", self.config.receipt_path());
        let bytes = self.storage.read_file(self.config.receipt_path())?;
        let html = String::from_utf8_lossy(&bytes);
        tracing::debug!("Receipt size: {} bytes", bytes.len());

        let options = ParseOptions {
            placeholder_image: self.config.placeholder_image().to_string(),
        };
        let mut diagnostics = Diagnostics::new();
        let items = extract_items_from_html(store, &html, &options, &mut diagnostics);

        if items.is_empty() {
            diagnostics.warn(format!(
                "No items found in {}; is this a {} order page?",
                self.config.receipt_path(),
                store.display_name()
            ));
        }

        Ok((items, diagnostics))
    }

    fn transform(&self, items: Vec<CanonicalItem>, mut diagnostics: Diagnostics) -> Result<SplitReport> {
        let store: Store = self.config.store().parse()?;
        let allocations = resolve_allocations(
            &items,
            self.config.people(),
            self.config.assignments(),
            &mut diagnostics,
        )?;
        let summary = aggregate(&items, &allocations);

        if summary.split.is_empty() {
            diagnostics.info("No items have been assigned to buyers yet");
        }

        Ok(SplitReport {
            store,
            items,
            allocations,
            summary,
            diagnostics,
        })
    }

    fn load(&self, report: SplitReport) -> Result<String> {
        let files = report::render(&report, self.config.output_formats())?;

        if let Some(archive_name) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, content) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(content)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let path = self.output_file(archive_name);
            tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), path);
            self.storage.write_file(&path, &zip_data)?;
            return Ok(path);
        }

        for (name, content) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, content.len());
            self.storage.write_file(&path, content)?;
        }

        Ok(self.config.output_path().to_string())
    }
}
