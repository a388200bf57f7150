use clap::Parser;
use sheet_fetch::config::LogFormat;
use sheet_fetch::utils::{logger, validation::Validate};
use sheet_fetch::{CliConfig, FetchConfig, FetchError, GoogleSheets, SheetFetcher};

fn fail(e: &FetchError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Fetch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Text => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match FetchConfig::from_cli(&cli).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let provider = match GoogleSheets::new(&config.http) {
        Ok(provider) => provider,
        Err(e) => fail(&e),
    };
    let fetcher = SheetFetcher::new(provider, config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = fetcher.run(&mut out).await {
        fail(&e);
    }
}
