//! # Axon Types Crate
//!
//! Wire protocol types and the clock port shared by the Axon crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the connect request, grant, and denial shapes
//!   are defined here and nowhere else.
//! - **Categorical Denials**: a denial carries one `DenialCode` and the fixed
//!   message for that code. Request content never leaks into a denial.
//! - **Injectable Time**: every time-dependent check reads the clock through
//!   `TimeSource` so tests can pin "now".

pub mod protocol;
pub mod time;

pub use protocol::*;
pub use time::*;
