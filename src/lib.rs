pub mod boundary;
pub mod build_options;
pub mod bump;
pub mod cli;
pub mod config;
pub mod domain;
pub mod env;
pub mod error;
pub mod forecast;
pub mod planner;
pub mod sources;
pub mod telemetry;
pub mod ui;

pub use error::{ReleasePlanError, Result};
