use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{info, warn};
use thiserror::Error;

use crate::blockchain::pow::find_proof_until;
use crate::blockchain::{
    Address, Block, Chain, ChainError, ChainSnapshot, ChainValidity, PeerRegistry, PowError,
    Transaction, Wallet,
};
use crate::config::NodeConfig;

/// Errors that can occur during node operations
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Chain error: {0}")]
    ChainError(#[from] ChainError),

    #[error("Mining error: {0}")]
    PowError(#[from] PowError),

    #[error("Mining worker failed: {0}")]
    WorkerError(String),
}

/// A ledger node: one identity, one chain, and the peers it knows about.
///
/// The chain sits behind a single mutex so that sealing and conflict resolution
/// swap blocks and pending transactions together. When both locks are needed
/// the registry is locked first.
#[derive(Debug)]
pub struct Node {
    identity: Wallet,
    chain: Mutex<Chain>,
    peers: Mutex<PeerRegistry>,
    mining_timeout: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Node {
    pub fn new(config: &NodeConfig) -> Self {
        let identity = Wallet::generate();
        let peers = PeerRegistry::new(identity.address().clone());

        info!("Node identity {}", identity.address());

        Node {
            identity,
            chain: Mutex::new(Chain::new()),
            peers: Mutex::new(peers),
            mining_timeout: config.mining_timeout(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock_chain(&self) -> MutexGuard<'_, Chain> {
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_peers(&self) -> MutexGuard<'_, PeerRegistry> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn identity(&self) -> &Address {
        self.identity.address()
    }

    pub fn chain_snapshot(&self) -> ChainSnapshot {
        self.lock_chain().snapshot()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.lock_chain().pending_transactions().to_vec()
    }

    pub fn submit_transaction(&self, sender: Address, recipient: Address, amount: f64) -> u64 {
        self.lock_chain().submit_transaction(sender, recipient, amount)
    }

    /// Seals with a caller-supplied proof and previous digest claim
    pub fn seal_block(&self, proof: u64, previous_digest: String) -> Result<Block, NodeError> {
        Ok(self.lock_chain().seal_block(proof, previous_digest)?)
    }

    pub fn validate(&self) -> ChainValidity {
        self.lock_chain().validate()
    }

    pub fn register_peer(&self, identifier: Address, snapshot: Option<ChainSnapshot>) -> usize {
        let mut peers = self.lock_peers();
        peers.register(identifier, snapshot);
        peers.len()
    }

    pub fn peer_ids(&self) -> Vec<Address> {
        self.lock_peers().identifiers()
    }

    pub fn resolve_conflicts(&self) -> bool {
        let peers = self.lock_peers();
        let mut chain = self.lock_chain();
        chain.resolve_conflicts(&peers)
    }

    /// Aborts any in-flight and future proof searches
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Mines the next block on a blocking worker and seals it against the
    /// chain's own last block.
    ///
    /// The search gives up at the configured timeout or on shutdown. A timeout
    /// too large to represent as an instant means no deadline. The found proof
    /// is checked against whatever the tip is once the search returns, so a
    /// proof that no longer fits that tip is rejected.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        let previous_proof = self.lock_chain().last_block().proof();
        let deadline = Instant::now().checked_add(self.mining_timeout);
        let cancel = Arc::clone(&self.shutdown);

        let proof = tokio::task::spawn_blocking(move || {
            find_proof_until(previous_proof, &cancel, deadline)
        })
        .await
        .map_err(|e| NodeError::WorkerError(e.to_string()))??;

        let mut chain = self.lock_chain();
        let previous_digest = chain.last_block().digest();

        chain.seal_block(proof, previous_digest).map_err(|err| {
            warn!("Mined proof {} went stale: {}", proof, err);
            NodeError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::pow::find_proof;

    fn test_node() -> Node {
        Node::new(&NodeConfig::default())
    }

    #[test]
    fn test_new_node() {
        let node = test_node();

        assert_eq!(node.chain_snapshot().len(), 1);
        assert_eq!(node.peer_ids(), vec![node.identity().clone()]);
        assert_eq!(node.validate(), ChainValidity::CorrectChain);
    }

    #[test]
    fn test_register_peer_counts_distinct() {
        let node = test_node();

        assert_eq!(node.register_peer("a".into(), None), 2);
        assert_eq!(node.register_peer("b".into(), None), 3);
        assert_eq!(node.register_peer("a".into(), None), 3);
    }

    #[test]
    fn test_seal_block_surfaces_rejection() {
        let node = test_node();
        let digest = node.chain_snapshot().blocks()[0].digest();

        let result = node.seal_block(1, digest);
        assert!(matches!(
            result,
            Err(NodeError::ChainError(ChainError::InvalidProof { proof: 1, .. }))
        ));
    }

    #[tokio::test]
    async fn test_mine_seals_pending() {
        let node = test_node();
        node.submit_transaction("a".into(), "b".into(), 3.0);

        let block = node.mine().await.unwrap();

        assert_eq!(block.index(), 1);
        assert_eq!(block.proof(), 4104);
        assert_eq!(block.transactions().len(), 1);
        assert!(node.pending_transactions().is_empty());
        assert_eq!(node.validate(), ChainValidity::CorrectChain);
    }

    #[tokio::test]
    async fn test_mine_after_shutdown() {
        let node = test_node();
        node.shutdown();

        let result = node.mine().await;
        assert!(matches!(
            result,
            Err(NodeError::PowError(PowError::Cancelled { .. }))
        ));
        assert_eq!(node.chain_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_mine_with_zero_timeout() {
        let config = NodeConfig {
            mining_timeout_secs: 0,
            ..NodeConfig::default()
        };
        let node = Node::new(&config);

        let result = node.mine().await;
        assert!(matches!(
            result,
            Err(NodeError::PowError(PowError::TimedOut { .. }))
        ));
    }

    #[tokio::test]
    async fn test_mine_with_unrepresentable_timeout() {
        let config = NodeConfig {
            mining_timeout_secs: u64::MAX,
            ..NodeConfig::default()
        };
        let node = Node::new(&config);

        let block = node.mine().await.unwrap();
        assert_eq!(block.proof(), 4104);
        assert_eq!(node.chain_snapshot().len(), 2);
    }

    #[test]
    fn test_proof_checked_against_current_tip() {
        let node = test_node();
        let proof = find_proof(node.chain_snapshot().blocks()[0].proof());

        // A longer peer chain whose tip carries the same proof as our genesis
        let mut peer = Chain::new();
        for _ in 0..2 {
            let (next, digest) = {
                let last = peer.last_block();
                (find_proof(last.proof()), last.digest())
            };
            peer.seal_block(next, digest).unwrap();
        }
        assert_eq!(peer.last_block().proof(), 100);

        node.register_peer("peer".into(), Some(peer.snapshot()));
        assert!(node.resolve_conflicts());

        let tip_digest = peer.last_block().digest();
        let block = node.seal_block(proof, tip_digest).unwrap();
        assert_eq!(block.index(), 3);
        assert_eq!(node.validate(), ChainValidity::CorrectChain);
    }

    #[test]
    fn test_resolve_conflicts_adopts_peer() {
        let node = test_node();

        let mut peer = Chain::new();
        for _ in 0..2 {
            let (proof, digest) = {
                let last = peer.last_block();
                (find_proof(last.proof()), last.digest())
            };
            peer.seal_block(proof, digest).unwrap();
        }

        node.register_peer("peer".into(), None);
        assert!(!node.resolve_conflicts());

        node.register_peer("peer".into(), Some(peer.snapshot()));
        assert!(node.resolve_conflicts());
        assert_eq!(node.chain_snapshot(), peer.snapshot());
    }
}
