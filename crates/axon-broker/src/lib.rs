//! # Axon Broker
//!
//! The connect pipeline. One call to `connect` is one synchronous pass over
//! the current registry state; there are no retries.
//!
//! ## Pipeline
//!
//! | Step | Check | Denial |
//! |------|-------|--------|
//! | 1 | payload is base64url | `SIGNATURE_INVALID` |
//! | 2 | Ed25519 signature over the payload bytes | `SIGNATURE_INVALID` |
//! | 3 | payload is JSON | `SIGNATURE_INVALID` |
//! | 4 | JSON is a well-formed connect request | `SIGNATURE_INVALID` |
//! | 5 | audit `connect_attempt` | - |
//! | 6 | timestamp inside the replay window, nonce unseen | `TIMESTAMP_EXPIRED`, `NONCE_REPLAYED` |
//! | 7 | target NPI is registered | `PROVIDER_NOT_FOUND` |
//! | 8 | target status is `active` | `CREDENTIALS_INVALID` |
//! | 9 | a live endpoint resolves | `ENDPOINT_UNAVAILABLE` |
//! | 10 | audit `connect_granted`, return grant | - |
//!
//! Steps 1 to 4 share one code so a caller cannot tell which stage rejected
//! the request. Every denial is audited as `connect_denied` before returning.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - replay guard, envelope handling, endpoint resolution, config, errors
//! - `ports/` - `ConnectionBrokerApi` (inbound), `EntryLookup` and `AuditSink` (outbound)
//! - `service/` - `ConnectionBroker`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::config::BrokerConfig;
pub use domain::endpoint::{is_heartbeat_stale, resolve_endpoint, EndpointUnavailable, ResolvedEndpoint};
pub use domain::envelope::{open_request, seal, seal_request, EnvelopeRejection};
pub use domain::errors::BrokerError;
pub use domain::replay::{ReplayGuard, ReplayRejection};
pub use ports::inbound::ConnectionBrokerApi;
pub use ports::outbound::{AuditSink, EntryLookup};
pub use service::ConnectionBroker;
