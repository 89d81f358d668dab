//! # Proof Lifecycle Across All Five Circuits
//!
//! One ceremony, five circuits: completeness (honest witness → accepted
//! proof), envelope round-trips (JSON and binary, byte-exact), and
//! soundness under single mutations. These run the full Groth16 path,
//! not the constraint-system shortcut the unit tests use.

use std::sync::Arc;

use ark_bn254::Fr;
use chrono::{DateTime, Utc};

use zap_core::{hash_to_field, Pid};
use zap_crypto::poseidon::leaf_hash;
use zap_crypto::{MerkleTree, OwnerSecret, Salt};
use zap_zkp::circuits::{CircuitType, LOCKER_TREE_DEPTH, MEMBERSHIP_TREE_DEPTH};
use zap_zkp::prover::{ProofRequest, Prover};
use zap_zkp::setup::{CircuitKeys, SetupCeremony};
use zap_zkp::{ProofEnvelope, Verifier, ZkpError};

fn ceremony() -> SetupCeremony {
    let mut ceremony = SetupCeremony::new();
    ceremony.contribute("registry-operator", [11u8; 32]);
    ceremony.contribute("carrier-consortium", [22u8; 32]);
    ceremony.contribute("independent-auditor", [33u8; 32]);
    ceremony
}

/// Setup is the expensive step; share one key pair per circuit across
/// every test in this binary.
fn keys_for(circuit_type: CircuitType) -> Arc<CircuitKeys> {
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};
    static CACHE: OnceLock<Mutex<HashMap<CircuitType, Arc<CircuitKeys>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap();
    cache
        .entry(circuit_type)
        .or_insert_with(|| Arc::new(ceremony().finalize(circuit_type, 1).unwrap()))
        .clone()
}

fn issued_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_754_500_000, 0).unwrap()
}

/// All five requests, each with an honestly constructed witness.
fn honest_requests() -> Vec<ProofRequest> {
    // Membership: a 6-address delivery set.
    let pids: Vec<Pid> = [
        "PK/ICT/Islamabad/F-7/H-12",
        "PK/ICT/Islamabad/F-8/H-3",
        "SG/Queenstown/Blk-88/04-123",
        "DE/BE/Berlin/Mitte/Alt-Moabit-9",
        "US/CA/San-Francisco/Mission/3301",
        "PK/Punjab/Lahore/Gulberg/H-9",
    ]
    .iter()
    .map(|s| Pid::parse(s).unwrap())
    .collect();
    let leaves: Vec<Fr> = pids.iter().map(|p| leaf_hash(&p.digest())).collect();
    let address_tree = MerkleTree::build(MEMBERSHIP_TREE_DEPTH, &leaves).unwrap();

    // Locker: facility with 20 lockers.
    let lockers: Vec<Fr> = (0..20)
        .map(|i| hash_to_field(format!("locker-{i:02}").as_bytes()))
        .collect();
    let locker_leaves: Vec<Fr> = lockers.iter().map(leaf_hash).collect();
    let locker_tree = MerkleTree::build(LOCKER_TREE_DEPTH, &locker_leaves).unwrap();

    vec![
        ProofRequest::Membership {
            identifier: pids[2].digest(),
            witness: address_tree.prove_index(2).unwrap(),
            issued_at: issued_at(),
        },
        ProofRequest::Structure {
            pid: pids[0].clone(),
            salt: Salt::from_bytes([7u8; 32]),
        },
        ProofRequest::SelectiveReveal {
            fields: (0..8).map(|i| Fr::from(1000 + i as u64)).collect(),
            salt: Salt::from_bytes([8u8; 32]),
            reveal_indices: vec![0, 3],
        },
        ProofRequest::Version {
            secret: OwnerSecret::from_bytes([9u8; 32]),
            old_pid: pids[0].digest(),
            new_pid: pids[5].digest(),
            nonce: Fr::from(42u64),
        },
        ProofRequest::Locker {
            locker: lockers[13],
            witness: locker_tree.prove_index(13).unwrap(),
            facility: hash_to_field(b"facility-islamabad-01"),
            nonce: Fr::from(99u64),
        },
    ]
}

#[test]
fn completeness_all_five_circuits() {
    for request in honest_requests() {
        let circuit_type = request.circuit_type();
        let keys = keys_for(circuit_type);
        let prover = Prover::new(keys.clone());
        let verifier = Verifier::new(keys).unwrap();

        let envelope = prover.prove(request).unwrap();
        assert_eq!(envelope.circuit_type, circuit_type);
        assert_eq!(
            envelope.public_signals.len(),
            circuit_type.public_signal_count()
        );
        assert!(
            verifier.verify(&envelope).unwrap(),
            "{circuit_type} proof must verify"
        );
    }
}

#[test]
fn envelope_round_trips_all_five_circuits() {
    for request in honest_requests() {
        let circuit_type = request.circuit_type();
        let keys = keys_for(circuit_type);
        let prover = Prover::new(keys.clone());
        let verifier = Verifier::new(keys).unwrap();
        let envelope = prover.prove(request).unwrap();

        let from_json = ProofEnvelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(from_json, envelope, "{circuit_type} JSON round-trip");

        let bytes = envelope.to_bytes();
        let from_bytes = ProofEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(from_bytes, envelope, "{circuit_type} binary round-trip");
        assert_eq!(from_bytes.to_bytes(), bytes);

        // Deserialized artifacts still verify.
        assert!(verifier.verify(&from_bytes).unwrap());
    }
}

#[test]
fn soundness_tampered_signal_rejected_per_circuit() {
    for request in honest_requests() {
        let circuit_type = request.circuit_type();
        let keys = keys_for(circuit_type);
        let prover = Prover::new(keys.clone());
        let verifier = Verifier::new(keys).unwrap();
        let envelope = prover.prove(request).unwrap();

        for index in 0..envelope.public_signals.len() {
            let mut tampered = envelope.clone();
            tampered.public_signals[index] += Fr::from(1u64);
            assert!(
                !verifier.verify(&tampered).unwrap(),
                "{circuit_type}: tampered signal {index} must be rejected"
            );
        }
    }
}

#[test]
fn soundness_wrong_merkle_witness_is_constraint_violation() {
    let requests = honest_requests();
    let (identifier, mut witness, at) = match &requests[0] {
        ProofRequest::Membership {
            identifier,
            witness,
            issued_at,
        } => (*identifier, witness.clone(), *issued_at),
        _ => unreachable!("first request is membership"),
    };

    // One flipped direction bit.
    witness.path_indices[0] = !witness.path_indices[0];

    let prover = Prover::new(keys_for(CircuitType::Membership));
    let err = prover
        .prove(ProofRequest::Membership {
            identifier,
            witness,
            issued_at: at,
        })
        .unwrap_err();
    assert!(
        matches!(err, ZkpError::ConstraintViolation { .. }),
        "got {err:?}"
    );
    assert!(err.is_recoverable());
}

#[test]
fn proofs_do_not_cross_circuits() {
    // A valid version proof presented to a locker verifier (same signal
    // count is irrelevant — the tag mismatch is caught first).
    let version_keys = keys_for(CircuitType::Version);
    let locker_keys = keys_for(CircuitType::Locker);

    let envelope = Prover::new(version_keys)
        .prove(ProofRequest::Version {
            secret: OwnerSecret::from_bytes([1u8; 32]),
            old_pid: Fr::from(1u64),
            new_pid: Fr::from(2u64),
            nonce: Fr::from(3u64),
        })
        .unwrap();

    let locker_verifier = Verifier::new(locker_keys).unwrap();
    assert!(matches!(
        locker_verifier.verify(&envelope),
        Err(ZkpError::KeyMismatch { .. })
    ));
}

#[test]
fn rotated_keys_invalidate_old_proofs() {
    let ceremony = ceremony();
    let v1 = Arc::new(ceremony.finalize(CircuitType::Version, 1).unwrap());
    let v2 = Arc::new(ceremony.finalize(CircuitType::Version, 2).unwrap());

    let envelope = Prover::new(v1)
        .prove(ProofRequest::Version {
            secret: OwnerSecret::from_bytes([1u8; 32]),
            old_pid: Fr::from(1u64),
            new_pid: Fr::from(2u64),
            nonce: Fr::from(3u64),
        })
        .unwrap();

    let v2_verifier = Verifier::new(v2).unwrap();
    assert!(matches!(
        v2_verifier.verify(&envelope),
        Err(ZkpError::KeyMismatch { .. })
    ));
}
