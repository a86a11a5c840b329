//! Inbound port: the connect operation.

use crate::domain::errors::BrokerError;
use axon_types::{ConnectOutcome, SignedMessage};

/// Decides whether a patient agent may connect to a provider.
pub trait ConnectionBrokerApi: Send + Sync {
    /// Run the pipeline once for `message`, verified against
    /// `patient_public_key`.
    ///
    /// Every request problem is an `Ok` denial. `Err` means the attempt or
    /// its outcome could not be audited.
    fn connect(
        &self,
        message: &SignedMessage,
        patient_public_key: &str,
    ) -> Result<ConnectOutcome, BrokerError>;
}
