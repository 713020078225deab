//! tshare - share coding-assistant transcripts safely
//!
//! This crate provides the core functionality for the `tshare` CLI tool:
//! sanitizing a transcript before it leaves the machine, and importing a
//! shared transcript under fresh identifiers.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`transcript`] - Record model, JSONL codec, sanitizer, redactor, remapper
//! - [`store`] - Share store and local projects layout
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod transcript;

pub use error::{Error, Result};
