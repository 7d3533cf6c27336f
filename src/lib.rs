//! Core library for temporal contact group detection

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod storage;

pub use anyhow::{anyhow, Result};
pub use config::Config;
pub use error::{GroupError, RecordError};
