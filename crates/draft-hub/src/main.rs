// Draft hub entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout is the report)
// 2. Parse the command line
// 3. Load config
// 4. Load the data snapshot
// 5. Render the requested view

mod commands;

use anyhow::Context;
use clap::Parser;
use draft_hub_core::config;
use draft_hub_core::dataset;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Draft hub starting up");

    // 2. Parse the command line
    let cli = commands::Cli::parse();

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: bundle={}", config.data.bundle);

    // 4. Load the data snapshot
    let data = dataset::load_all(&config).context("failed to load dataset")?;

    // 5. Render
    let today = chrono::Local::now().date_naive();
    let output = commands::run(&cli.command, &data, &config, today)?;
    print!("{output}");

    info!("Draft hub finished");
    Ok(())
}

/// Initialize tracing to log to a file so stdout carries only the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draft-hub.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_hub=info,draft_hub_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
