//! MarketLens CLI entry point

use clap::Parser;
use tracing::debug;

use marketlens::cli::{
    exit_code, load_config_logged, log_filter, run, subscriber, Cli, BOOTSTRAP_LEVEL,
    EXIT_SUCCESS,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match start(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    // Logs go to stderr so answers on stdout stay clean
    let bootstrap = subscriber(log_filter(BOOTSTRAP_LEVEL), std::io::stderr);
    let config = load_config_logged(&cli, bootstrap)?;
    tracing::subscriber::set_global_default(subscriber(
        log_filter(&config.logging.level),
        std::io::stderr,
    ))?;
    debug!(data = ?config.data, model = %config.llm.model, "Configuration resolved");

    run(cli.command(), &config).await
}
