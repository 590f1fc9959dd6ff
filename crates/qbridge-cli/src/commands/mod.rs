//! CLI command implementations.

pub mod common;
pub mod convert;
pub mod gates;
pub mod run;
pub mod version;
