//! # Ports Layer
//!
//! - `inbound` - what the broker offers
//! - `outbound` - what the broker needs

pub mod inbound;
pub mod outbound;
