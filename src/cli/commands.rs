//! Command handlers
//!
//! Each handler resolves what it needs from the configuration, does its work
//! and prints to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use marketlens_agents::{OpenAiAdapter, Session, SessionOptions};
use marketlens_core::{
    list_data_files, merge_sources, query_data, AppConfig, Dataset, MergeSources, Operation,
    QueryArgs, QueryResult, RowRecord, DATE_COLUMN,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::cli::args::{Cli, Command};
use crate::cli::repl::run_repl;

/// Resolve configuration and apply command-line overrides
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data.dir = dir.clone();
    }
    Ok(config)
}

/// Dispatch one command
pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Chat => {
            let mut session = build_session(config)?;
            run_repl(&mut session).await
        }
        Command::Ask { question } => {
            let mut session = build_session(config)?;
            let answer = session.ask(&question.join(" ")).await?;
            println!("{}", answer);
            Ok(())
        }
        Command::Show { tail, rows } => show(config, tail, rows),
        Command::Files => files(config),
        Command::Merge {
            gold,
            spy,
            sensex,
            output,
        } => merge(config, gold, spy, sensex, output),
    }
}

/// Load the dataset; the assistant refuses to start without it
fn open_dataset(config: &AppConfig) -> Result<Arc<Dataset>> {
    let dataset = Dataset::open(&config.data.dir, &config.data.file)
        .with_context(|| format!("Cannot start without {}", config.data.dataset_path().display()))?;
    Ok(Arc::new(dataset))
}

fn build_session(config: &AppConfig) -> Result<Session> {
    let dataset = open_dataset(config)?;
    let adapter = OpenAiAdapter::from_config(&config.llm).context("Failed to set up model client")?;
    Ok(Session::new(
        Arc::new(adapter),
        dataset,
        SessionOptions::from(config),
    ))
}

fn show(config: &AppConfig, tail: bool, rows: usize) -> Result<()> {
    let dataset = open_dataset(config)?;
    let operation = if tail { Operation::Tail } else { Operation::Head };
    let args = QueryArgs {
        n: Some(rows),
        ..QueryArgs::new(operation)
    };

    match query_data(&dataset, args) {
        QueryResult::Rows { data } => {
            print!("{}", format_rows(&data));
            Ok(())
        }
        QueryResult::Error { error } => anyhow::bail!(error),
        other => anyhow::bail!("Unexpected query result: {:?}", other),
    }
}

fn files(config: &AppConfig) -> Result<()> {
    let files = list_data_files(&config.data.dir)
        .with_context(|| format!("Cannot list {}", config.data.dir.display()))?;
    if files.is_empty() {
        println!("No files in {}", config.data.dir.display());
    }
    for file in files {
        println!("{}", file);
    }
    Ok(())
}

fn merge(
    config: &AppConfig,
    gold: Option<PathBuf>,
    spy: Option<PathBuf>,
    sensex: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let defaults = MergeSources::in_dir(&config.data.dir);
    let sources = MergeSources {
        gold: gold.unwrap_or(defaults.gold),
        spy: spy.unwrap_or(defaults.spy),
        sensex: sensex.unwrap_or(defaults.sensex),
    };
    let output = output.unwrap_or_else(|| config.data.dataset_path());

    let rows = merge_sources(&sources, &output).context("Merge failed")?;
    info!(rows, "Merge complete");
    println!("Merged {} rows into {}", rows, output.display());
    Ok(())
}

/// Render rows as a fixed-width table
pub fn format_rows(rows: &[RowRecord]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)\n".to_string();
    };
    let columns: Vec<&String> = first.values.keys().collect();
    let width = columns.iter().map(|c| c.len()).max().unwrap_or(0).max(12);

    let mut out = format!("{:<10}", DATE_COLUMN);
    for column in &columns {
        out.push_str(&format!("  {:>width$}", column, width = width));
    }
    out.push('\n');

    for row in rows {
        out.push_str(&format!("{:<10}", row.date.format("%Y-%m-%d")));
        for column in &columns {
            let cell = match row.values.get(*column).copied().flatten() {
                Some(value) => format!("{:.2}", value),
                None => "-".to_string(),
            };
            out.push_str(&format!("  {:>width$}", cell, width = width));
        }
        out.push('\n');
    }
    out
}
