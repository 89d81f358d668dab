//! # Prover Pool
//!
//! Proof generation is CPU-bound and orders of magnitude slower than
//! verification, so concurrent requests go through a bounded worker pool:
//! a concurrency cap sized to the machine's cores, and a queue bound for
//! backpressure. A full queue is an immediate
//! [`ZkpError::PoolSaturated`], not an unbounded wait.
//!
//! Requests share no mutable state — key material is read-only behind an
//! `Arc` — so workers are plain `spawn_blocking` dispatches. There is no
//! cancellation beyond the caller's deadline: a timed-out prove is a
//! failure and its (eventually completed) proof is discarded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::ZkpError;
use crate::proof::ProofEnvelope;
use crate::prover::{ProofRequest, Prover};

/// Bounded, backpressured proving pool.
pub struct ProverPool {
    prover: Arc<Prover>,
    workers: Arc<Semaphore>,
    queue: Arc<Semaphore>,
    queue_depth: usize,
}

impl ProverPool {
    /// A pool with explicit concurrency and queue bounds.
    ///
    /// `workers` proofs run at once; up to `queue_depth` may be in flight
    /// (running + waiting) before submissions are rejected.
    pub fn new(prover: Arc<Prover>, workers: usize, queue_depth: usize) -> Self {
        Self {
            prover,
            workers: Arc::new(Semaphore::new(workers.max(1))),
            queue: Arc::new(Semaphore::new(queue_depth.max(1))),
            queue_depth: queue_depth.max(1),
        }
    }

    /// A pool sized to available parallelism, with a queue of four
    /// requests per worker.
    pub fn with_default_capacity(prover: Arc<Prover>) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(prover, workers, workers * 4)
    }

    /// Configured queue bound.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Generate a proof on the pool.
    ///
    /// Returns [`ZkpError::PoolSaturated`] immediately when the queue is
    /// full — callers back off and retry rather than piling up.
    pub async fn prove(&self, request: ProofRequest) -> Result<ProofEnvelope, ZkpError> {
        let queued =
            self.queue
                .clone()
                .try_acquire_owned()
                .map_err(|_| ZkpError::PoolSaturated {
                    queue_depth: self.queue_depth,
                })?;
        let worker = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ZkpError::TaskFailed("prover pool closed".to_string()))?;

        let prover = self.prover.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let result = prover.prove(request);
            drop(worker);
            result
        })
        .await;
        drop(queued);

        outcome.map_err(|e| ZkpError::TaskFailed(e.to_string()))?
    }

    /// Generate a proof with a hard deadline. On expiry the call fails
    /// with [`ZkpError::Timeout`]; the abandoned worker result is
    /// discarded — proofs are all-or-nothing.
    pub async fn prove_with_timeout(
        &self,
        request: ProofRequest,
        deadline: Duration,
    ) -> Result<ProofEnvelope, ZkpError> {
        match tokio::time::timeout(deadline, self.prove(request)).await {
            Ok(result) => result,
            Err(_) => Err(ZkpError::Timeout(deadline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitType;
    use crate::setup::SetupCeremony;
    use ark_bn254::Fr;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use zap_crypto::OwnerSecret;

    fn pool(workers: usize, queue_depth: usize) -> ProverPool {
        let mut rng = StdRng::seed_from_u64(0);
        let keys = Arc::new(
            SetupCeremony::single_party(&mut rng)
                .finalize(CircuitType::Version, 1)
                .unwrap(),
        );
        ProverPool::new(Arc::new(Prover::new(keys)), workers, queue_depth)
    }

    fn request(tag: u64) -> ProofRequest {
        ProofRequest::Version {
            secret: OwnerSecret::from_bytes([1u8; 32]),
            old_pid: Fr::from(tag),
            new_pid: Fr::from(tag + 1),
            nonce: Fr::from(tag + 2),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_proofs_complete() {
        let pool = Arc::new(pool(2, 8));
        let mut handles = Vec::new();
        for i in 0..4u64 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move { pool.prove(request(i)).await }));
        }
        for handle in handles {
            let envelope = handle.await.unwrap().unwrap();
            assert_eq!(envelope.circuit_type, CircuitType::Version);
        }
    }

    #[tokio::test]
    async fn saturated_queue_rejects_immediately() {
        let pool = pool(1, 1);
        // Hold the single queue permit so the next submission bounces.
        let _held = pool.queue.clone().try_acquire_owned().unwrap();
        let err = pool.prove(request(0)).await.unwrap_err();
        assert!(matches!(err, ZkpError::PoolSaturated { queue_depth: 1 }));
        assert!(err.is_recoverable());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn generous_deadline_succeeds() {
        let pool = pool(1, 2);
        let envelope = pool
            .prove_with_timeout(request(7), Duration::from_secs(120))
            .await
            .unwrap();
        assert_eq!(envelope.public_signals.len(), 4);
    }
}
