//! Loads hh.ru job postings for a fixed set of employers into PostgreSQL
//! and answers a few analytical questions about them.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod telemetry;

pub use error::{Error, Result};
