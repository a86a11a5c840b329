//! # Domain Layer

pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod replay;
