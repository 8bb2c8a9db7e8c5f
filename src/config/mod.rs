//! Configuration model for workshop-branches.
//!
//! This module defines the Config struct that represents `workshop.yaml` at
//! the workshop root. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), defaults for every field, and validation.

mod model;
mod operations;


pub use model::{CONFIG_FILE_NAME, Config};
