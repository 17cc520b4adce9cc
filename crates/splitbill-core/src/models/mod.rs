//! Data models: the parsed bill and pipeline configuration.

pub mod bill;
pub mod config;
