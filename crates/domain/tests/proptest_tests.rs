//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{CircuitState, ConsensusRound, FaultType, HealthSnapshot, InstanceId, RetryState};
use proptest::prelude::*;

// ============================================================================
// ConsensusRound Property Tests
// ============================================================================

mod consensus_round_tests {
    use super::*;

    proptest! {
        #[test]
        fn quorum_requires_strict_majority(known in 1usize..50, voting in 0usize..50) {
            let voting = voting.min(known);
            let leader = Some(InstanceId::parse("astra-0").unwrap());
            let round = ConsensusRound::new(leader, voting, known);
            prop_assert_eq!(round.quorum_met, voting * 2 > known);
        }

        #[test]
        fn quorum_never_without_leader(known in 0usize..50, voting in 0usize..50) {
            let round = ConsensusRound::new(None, voting, known);
            prop_assert!(!round.quorum_met);
        }
    }
}

// ============================================================================
// InstanceId Property Tests
// ============================================================================

mod instance_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_ids_roundtrip_display(raw in "[a-z0-9][a-z0-9-]{0,40}") {
            let id = InstanceId::parse(raw.clone()).unwrap();
            prop_assert_eq!(id.to_string(), raw);
        }

        #[test]
        fn ids_with_inner_space_rejected(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            let raw = format!("{a} {b}");
            prop_assert!(InstanceId::parse(raw).is_err());
        }

        #[test]
        fn ordering_matches_string_ordering(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            let ia = InstanceId::parse(a.clone()).unwrap();
            let ib = InstanceId::parse(b.clone()).unwrap();
            prop_assert_eq!(ia.cmp(&ib), a.cmp(&b));
        }
    }
}

// ============================================================================
// FaultType Property Tests
// ============================================================================

mod fault_type_tests {
    use super::*;

    proptest! {
        #[test]
        fn arbitrary_strings_rarely_parse(raw in "\\PC{0,30}") {
            let known = FaultType::ALL.iter().any(|f| f.as_str() == raw);
            prop_assert_eq!(raw.parse::<FaultType>().is_ok(), known);
        }
    }
}

// ============================================================================
// HealthSnapshot Property Tests
// ============================================================================

mod health_snapshot_tests {
    use super::*;

    fn circuit_state() -> impl Strategy<Value = CircuitState> {
        prop_oneof![
            Just(CircuitState::Closed),
            Just(CircuitState::Open),
            Just(CircuitState::HalfOpen),
        ]
    }

    fn retry_state() -> impl Strategy<Value = RetryState> {
        prop_oneof![Just(RetryState::Normal), Just(RetryState::Elevated)]
    }

    proptest! {
        #[test]
        fn healthy_iff_all_nominal(
            circuit in circuit_state(),
            retry in retry_state(),
            known in 0usize..6,
            voting in 0usize..6,
        ) {
            let voting = voting.min(known);
            let leader = (voting > 0).then(|| InstanceId::parse("astra-0").unwrap());
            let round = ConsensusRound::new(leader, voting, known);
            let quorum = round.quorum_met;
            let snap = HealthSnapshot::compose(circuit, retry, vec![], round);
            let expected = circuit == CircuitState::Closed && retry == RetryState::Normal && quorum;
            prop_assert_eq!(snap.status().is_healthy(), expected);
        }
    }
}
