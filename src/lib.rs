//! Volume Seeder Library
//!
//! Fills a PostgreSQL database with synthetic rows until its on-disk size
//! crosses a target, reporting live progress.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod monitor;
pub mod seeder;
pub mod workers;

pub use config::Config;
pub use error::{Result, SeederError};
pub use seeder::{RunOutcome, RunSummary, Seeder};
