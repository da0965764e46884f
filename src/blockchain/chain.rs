use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::block::Block;
use super::crypto::Address;
use super::peers::PeerRegistry;
use super::pow::is_valid_proof;
use super::transaction::Transaction;

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Invalid proof {proof} for previous proof {previous_proof}")]
    InvalidProof { previous_proof: u64, proof: u64 },
}

/// Outcome of a full-chain consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainValidity {
    CorrectChain,
    ErroneousProof,
    ErroneousHash,
}

/// Walks adjacent pairs from index 1. The proof is checked before the link,
/// so a block wrong in both ways reports `ErroneousProof`.
fn validate_blocks(blocks: &[Block]) -> ChainValidity {
    for (position, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);

        if !is_valid_proof(previous.proof(), current.proof()) {
            debug!("Block at position {} carries an invalid proof", position + 1);
            return ChainValidity::ErroneousProof;
        }

        if current.previous_digest() != previous.digest() {
            debug!("Block at position {} is not linked to its predecessor", position + 1);
            return ChainValidity::ErroneousHash;
        }
    }

    ChainValidity::CorrectChain
}

/// Immutable copy of a chain's blocks and pending transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChainSnapshot {
    blocks: Vec<Block>,
    pending_transactions: Vec<Transaction>,
}

impl ChainSnapshot {
    pub fn new(blocks: Vec<Block>, pending_transactions: Vec<Transaction>) -> Self {
        ChainSnapshot {
            blocks,
            pending_transactions,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn validate(&self) -> ChainValidity {
        validate_blocks(&self.blocks)
    }
}

/// Represents the ledger: sealed blocks plus the buffer of pending transactions
#[derive(Debug, Clone)]
pub struct Chain {
    /// The chain of blocks, never empty
    blocks: Vec<Block>,

    /// Transactions to be included in the next block
    pending_transactions: Vec<Transaction>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Creates a new chain holding only the genesis block
    pub fn new() -> Self {
        Chain {
            blocks: vec![Block::genesis()],
            pending_transactions: Vec::new(),
        }
    }

    /// Rebuilds a chain from a snapshot. An empty snapshot yields a fresh chain.
    pub fn from_snapshot(snapshot: ChainSnapshot) -> Self {
        if snapshot.is_empty() {
            return Self::new();
        }

        Chain {
            blocks: snapshot.blocks,
            pending_transactions: snapshot.pending_transactions,
        }
    }

    /// Copies the current state out
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.blocks.clone(), self.pending_transactions.clone())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn last_block(&self) -> &Block {
        // `blocks` always holds at least the genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    /// Adds a new transaction to the pending buffer
    ///
    /// # Returns
    ///
    /// The index the transaction is expected to land in. Advisory only: a
    /// later conflict resolution can change it.
    pub fn submit_transaction(&mut self, sender: Address, recipient: Address, amount: f64) -> u64 {
        self.pending_transactions
            .push(Transaction::new(sender, recipient, amount));

        self.blocks.len() as u64 + 1
    }

    /// Seals the pending transactions into a new block
    ///
    /// # Arguments
    ///
    /// * `proof` - Proof of work against the last block's proof
    /// * `previous_digest` - Digest claimed for the last block, stored verbatim
    ///
    /// # Returns
    ///
    /// The new block, or `ChainError::InvalidProof` with the chain left untouched
    pub fn seal_block(
        &mut self,
        proof: u64,
        previous_digest: impl Into<String>,
    ) -> Result<Block, ChainError> {
        let previous_proof = self.last_block().proof();

        if !is_valid_proof(previous_proof, proof) {
            warn!("Rejected proof {} against previous proof {}", proof, previous_proof);
            return Err(ChainError::InvalidProof {
                previous_proof,
                proof,
            });
        }

        let mut block = Block::new(self.blocks.len() as u64, proof, previous_digest);
        block.append_transactions(std::mem::take(&mut self.pending_transactions));
        self.blocks.push(block.clone());

        info!(
            "Sealed block {} with {} transactions",
            block.index(),
            block.transactions().len()
        );

        Ok(block)
    }

    /// Validates the whole chain
    pub fn validate(&self) -> ChainValidity {
        validate_blocks(&self.blocks)
    }

    /// Adopts the first registered peer chain that validates and is strictly
    /// longer than this one.
    ///
    /// # Returns
    ///
    /// true if the local blocks and pending transactions were replaced
    pub fn resolve_conflicts(&mut self, peers: &PeerRegistry) -> bool {
        for (identifier, snapshot) in peers.iter() {
            let Some(snapshot) = snapshot else {
                continue;
            };

            if snapshot.len() <= self.blocks.len() {
                continue;
            }

            let validity = snapshot.validate();
            if validity != ChainValidity::CorrectChain {
                warn!("Ignoring chain from peer {}: {:?}", identifier, validity);
                continue;
            }

            info!(
                "Adopting chain of length {} from peer {} (local length {})",
                snapshot.len(),
                identifier,
                self.blocks.len()
            );
            self.blocks = snapshot.blocks.clone();
            self.pending_transactions = snapshot.pending_transactions.clone();
            return true;
        }

        false
    }
}
