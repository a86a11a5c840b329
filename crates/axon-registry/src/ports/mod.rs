//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (API exposed to the transport and the broker)
//! - `outbound.rs` - Driven ports (persistence and the provider catalog)

pub mod inbound;
pub mod outbound;
