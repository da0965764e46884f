use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::crypto::sha256_hex;
use super::transaction::Transaction;

/// Proof carried by every genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Placeholder link stored in the genesis block, which has no predecessor
pub const GENESIS_PREVIOUS_DIGEST: &str = "1";

/// Represents a block in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Position of the block in the chain at creation time
    index: u64,

    /// Proof of work admitted for this block
    proof: u64,

    /// Digest claimed for the preceding block
    previous_digest: String,

    /// Creation instant, captured once
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    created_at: DateTime<Utc>,

    /// Transactions sealed into this block
    transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a new empty block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `proof` - The proof of work
    /// * `previous_digest` - The digest of the previous block
    pub fn new(index: u64, proof: u64, previous_digest: impl Into<String>) -> Self {
        Self::with_timestamp(index, proof, previous_digest, Utc::now())
    }

    /// Creates a new empty block stamped with `created_at`
    pub fn with_timestamp(
        index: u64,
        proof: u64,
        previous_digest: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Block {
            index,
            proof,
            previous_digest: previous_digest.into(),
            created_at,
            transactions: Vec::new(),
        }
    }

    /// The fixed first block of every chain
    pub fn genesis() -> Self {
        Self::new(0, GENESIS_PROOF, GENESIS_PREVIOUS_DIGEST)
    }

    /// Appends a batch of transactions, preserving their order
    pub fn append_transactions<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Transaction>,
    {
        self.transactions.extend(batch);
    }

    /// Calculates the digest of the block
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of `index`, `proof`, `previous_digest` and `created_at`
    /// concatenated without delimiters, as a hexadecimal string. Transactions
    /// are not covered.
    pub fn digest(&self) -> String {
        sha256_hex(&format!(
            "{}{}{}{}",
            self.index, self.proof, self.previous_digest, self.created_at
        ))
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn proof(&self) -> u64 {
        self.proof
    }

    pub fn previous_digest(&self) -> &str {
        &self.previous_digest
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
