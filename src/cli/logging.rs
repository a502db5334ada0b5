//! Tracing setup
//!
//! Configuration is loaded before the configured log level is known, so
//! loading runs under a scoped bootstrap subscriber and the global one is
//! installed afterwards.

use anyhow::Result;
use marketlens_core::AppConfig;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::cli::args::Cli;
use crate::cli::commands::load_config;

/// Level used while the configuration itself is being loaded
pub const BOOTSTRAP_LEVEL: &str = "info";

/// `RUST_LOG` wins over the configured level
pub fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .finish()
}

/// Load configuration with its log lines routed through `bootstrap`
pub fn load_config_logged<S>(cli: &Cli, bootstrap: S) -> Result<AppConfig>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(bootstrap, || load_config(cli))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_config_loading_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketlens.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        let cli = Cli {
            config: Some(path),
            data_dir: None,
            command: None,
        };

        let captured = Captured::default();
        let writer = captured.clone();
        let bootstrap = subscriber(EnvFilter::new("debug"), move || writer.clone());
        load_config_logged(&cli, bootstrap).unwrap();

        let logs = captured.text();
        assert!(logs.contains("Loaded configuration from"), "logs: {logs}");
        if std::env::var("OPENAI_API_KEY").is_err() {
            assert!(logs.contains("No API key configured"), "logs: {logs}");
        }
    }
}
