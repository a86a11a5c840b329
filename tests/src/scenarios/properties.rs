//! # Broker Properties
//!
//! Determinism across identical requests, replay of an exact message, and
//! behaviour under concurrent callers sharing one runtime.

#[cfg(test)]
mod tests {
    use crate::harness::TestNode;
    use axon_audit::verify_chain;
    use axon_registry::test_utils::{ORG_NPI, PROVIDER_NPI};
    use axon_types::{ConnectOutcome, DenialCode};
    use std::sync::Arc;

    #[test]
    fn test_identical_requests_differ_only_in_connection_id() {
        let node = TestNode::with_active_pair();

        let ConnectOutcome::Grant(mut first) = node.connect_to(PROVIDER_NPI) else {
            panic!("expected grant");
        };
        let ConnectOutcome::Grant(mut second) = node.connect_to(PROVIDER_NPI) else {
            panic!("expected grant");
        };

        assert_ne!(first.connection_id, second.connection_id);
        first.connection_id.clear();
        second.connection_id.clear();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_replay_is_grant_then_replayed() {
        let node = TestNode::with_active_pair();
        let message = node.sign(&node.request(ORG_NPI));

        assert!(node.connect(&message).is_grant());
        assert_eq!(
            node.connect(&message).denial_code(),
            Some(DenialCode::NonceReplayed)
        );
    }

    #[test]
    fn test_same_nonce_race_yields_one_grant() {
        let node = Arc::new(TestNode::with_active_pair());
        let message = node.sign(&node.request(PROVIDER_NPI));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let node = node.clone();
                let message = message.clone();
                std::thread::spawn(move || node.connect(&message))
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|o| o.is_grant()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| o.denial_code() == Some(DenialCode::NonceReplayed))
                .count(),
            11
        );
    }

    #[test]
    fn test_concurrent_connects_keep_chain_valid() {
        let node = Arc::new(TestNode::with_active_pair());

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let node = node.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        assert!(node.connect_to(PROVIDER_NPI).is_grant());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let result = verify_chain(node.runtime.audit_path()).unwrap();
        assert!(result.valid);
        assert_eq!(result.entries, 120);
    }

    #[test]
    fn test_connects_during_registry_writes() {
        let node = Arc::new(TestNode::with_active_pair());

        let writer = {
            let node = node.clone();
            std::thread::spawn(move || {
                use axon_registry::{HealthStatus, RegistryApi};
                for _ in 0..20 {
                    node.runtime
                        .registry()
                        .record_heartbeat(ORG_NPI, HealthStatus::Reachable)
                        .unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let node = node.clone();
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| node.connect_to(PROVIDER_NPI).is_grant())
                        .count()
                })
            })
            .collect();

        writer.join().unwrap();
        let granted: usize = readers.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 40);
    }
}
