//! # Domain Layer
//!
//! Pure registry logic with no I/O.

pub mod entities;
pub mod errors;
pub mod npi;
pub mod search;
