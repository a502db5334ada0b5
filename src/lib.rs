//! MarketLens: ask questions about Gold, SPY and Sensex prices
//!
//! The binary is a thin shell over `marketlens-core` (dataset and queries)
//! and `marketlens-agents` (model session). This library half holds the CLI
//! wiring so it can be tested without spawning the binary.

pub mod cli;
