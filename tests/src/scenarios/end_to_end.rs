//! # Connect Scenarios
//!
//! | Scenario | Setup | Expected |
//! |----------|-------|----------|
//! | A | active organization + affiliated active provider | grant with the organization's endpoint |
//! | B | as A, organization endpoint unreachable | `ENDPOINT_UNAVAILABLE` |
//! | C | signed with a different key | `SIGNATURE_INVALID` |
//! | D | nonce reused with a new timestamp | grant, then `NONCE_REPLAYED` |
//! | E | unregistered target | `PROVIDER_NOT_FOUND`, one attempt + one denial audited |

#[cfg(test)]
mod tests {
    use crate::harness::{TestNode, PATIENT_AGENT_ID};
    use axon_audit::{verify_chain, AuditEventType};
    use axon_broker::{seal_request, ConnectionBrokerApi};
    use axon_identity::generate_keypair;
    use axon_registry::test_utils::{ENDPOINT_URL, ORG_NPI, PROVIDER_NPI, UNREGISTERED_NPI};
    use axon_registry::{HealthStatus, RegistryApi};
    use axon_types::{format_timestamp, ConnectOutcome, DenialCode, TimeSource};

    #[test]
    fn test_scenario_a_provider_grant_uses_organization_endpoint() {
        let node = TestNode::with_active_pair();

        let outcome = node.connect_to(PROVIDER_NPI);

        let ConnectOutcome::Grant(grant) = &outcome else {
            panic!("expected grant, got {outcome:?}");
        };
        assert_eq!(grant.provider_npi, PROVIDER_NPI);
        assert_eq!(grant.neuron_endpoint, ENDPOINT_URL);
        assert_eq!(grant.protocol_version, "1.0.0");

        let trail = node.audit_for(&grant.connection_id);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].event_type, AuditEventType::ConnectAttempt);
        assert_eq!(trail[0].details["patient_agent_id"], PATIENT_AGENT_ID);
        assert_eq!(trail[1].event_type, AuditEventType::ConnectGranted);
        assert_eq!(trail[1].details["neuron_endpoint"], ENDPOINT_URL);
    }

    #[test]
    fn test_scenario_b_unreachable_organization() {
        let node = TestNode::with_active_pair();
        node.runtime
            .registry()
            .record_heartbeat(ORG_NPI, HealthStatus::Unreachable)
            .unwrap();

        let outcome = node.connect_to(PROVIDER_NPI);

        assert_eq!(outcome.denial_code(), Some(DenialCode::EndpointUnavailable));
        let ConnectOutcome::Denial(denial) = &outcome else {
            unreachable!()
        };
        assert_eq!(denial.message, "Provider endpoint is not available");
        assert!(!denial.message.contains(ENDPOINT_URL));
    }

    #[test]
    fn test_scenario_c_foreign_signature() {
        let node = TestNode::with_active_pair();
        let impostor = generate_keypair();
        // Payload names the patient's key but is signed by someone else.
        let request = node.request(PROVIDER_NPI);
        let message =
            seal_request(&request, &impostor.private_key, &impostor.public_key).unwrap();

        let outcome = node.connect(&message);

        assert_eq!(outcome.denial_code(), Some(DenialCode::SignatureInvalid));
        let trail = node.audit_for(outcome.connection_id());
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].event_type, AuditEventType::ConnectDenied);
        assert_eq!(trail[0].details["code"], "SIGNATURE_INVALID");
        assert!(!trail[0].details.contains_key("provider_npi"));
    }

    #[test]
    fn test_scenario_d_nonce_reuse_with_new_timestamp() {
        let node = TestNode::with_active_pair();
        let first = node.request(PROVIDER_NPI);

        node.clock.advance(chrono::Duration::seconds(30));
        let mut second = first.clone();
        second.timestamp = format_timestamp(node.clock.now());

        assert!(node.connect(&node.sign(&first)).is_grant());
        assert_eq!(
            node.connect(&node.sign(&second)).denial_code(),
            Some(DenialCode::NonceReplayed)
        );
    }

    #[test]
    fn test_scenario_e_unregistered_target() {
        let node = TestNode::with_active_pair();

        let outcome = node.connect_to(UNREGISTERED_NPI);

        assert_eq!(outcome.denial_code(), Some(DenialCode::ProviderNotFound));
        let trail = node.audit_for(outcome.connection_id());
        let kinds: Vec<_> = trail.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![AuditEventType::ConnectAttempt, AuditEventType::ConnectDenied]
        );
        assert_eq!(trail[1].details["code"], "PROVIDER_NOT_FOUND");
        assert_eq!(trail[1].details["provider_npi"], UNREGISTERED_NPI);
        assert_eq!(trail[1].prev_hash, trail[0].hash);
    }

    #[test]
    fn test_audit_chain_valid_after_mixed_outcomes() {
        let node = TestNode::with_active_pair();
        node.connect_to(PROVIDER_NPI);
        node.connect_to(UNREGISTERED_NPI);
        let stranger = generate_keypair();
        node.runtime
            .broker()
            .connect(&node.sign(&node.request(ORG_NPI)), &stranger.public_key)
            .unwrap();

        // grant: 2, not found: 2, bad signature: 1
        let result = verify_chain(node.runtime.audit_path()).unwrap();
        assert!(result.valid);
        assert_eq!(result.entries, 5);
    }
}
