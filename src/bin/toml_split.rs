use clap::Parser;
use receipt_split::core::receipt::{extract_items_from_html, ParseOptions};
use receipt_split::core::report::format_money;
use receipt_split::core::{ConfigProvider, Storage};
use receipt_split::utils::{logger, validation::Validate};
use receipt_split::{Diagnostics, LocalStorage, SplitConfig, SplitEngine, SplitPipeline, Store};

#[derive(Parser)]
#[command(name = "toml-split")]
#[command(about = "Split a saved order page using a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "split.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit log events as JSON lines
    #[arg(long)]
    json_log: bool,

    /// Override the store from the config
    #[arg(long)]
    store: Option<String>,

    /// Dry run - list the parsed items without splitting or writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_log);

    tracing::info!("🚀 Starting TOML-based receipt split");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match SplitConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(store) = args.store {
        tracing::info!("🔧 Store overridden to: {}", store);
        config = config.with_store(store);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let storage = LocalStorage::default();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        perform_dry_run(&config, &storage)?;
        return Ok(());
    }

    let engine = SplitEngine::new(SplitPipeline::new(storage, config));

    match engine.run() {
        Ok(output_path) => {
            println!("✅ Receipt split completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Receipt split failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &SplitConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Store: {}", config.store());
    tracing::info!("  Receipt: {}", config.receipt_path());
    if config.people().is_empty() {
        tracing::info!("  People: (any name)");
    } else {
        tracing::info!("  People: {}", config.people().join(", "));
    }
    tracing::info!("  Assignments: {}", config.assignments().len());
    tracing::info!("  Output: {}", config.output_path());
    tracing::info!("  Formats: {}", config.output_formats().join(", "));
    if let Some(archive) = config.archive_name() {
        tracing::info!("  Archive: {}", archive);
    }
}

fn perform_dry_run(config: &SplitConfig, storage: &LocalStorage) -> anyhow::Result<()> {
    let store: Store = config.store().parse()?;
    let bytes = storage.read_file(config.receipt_path())?;
    let html = String::from_utf8_lossy(&bytes);

    let options = ParseOptions {
        placeholder_image: config.placeholder_image().to_string(),
    };
    let mut diagnostics = Diagnostics::new();
    let items = extract_items_from_html(store, &html, &options, &mut diagnostics);

    println!("{} items found on the {} receipt:", items.len(), store.display_name());
    for (i, item) in items.iter().enumerate() {
        println!(
            "  {:>3}. {} x {} {} £{}",
            i + 1,
            item.quantity,
            item.name,
            item.weight,
            format_money(item.price)
        );
    }
    for skipped in diagnostics.skipped() {
        println!("  skipped {} entry #{}: {}", skipped.layout, skipped.index, skipped.reason);
    }

    Ok(())
}
