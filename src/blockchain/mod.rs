// Ledger module
//
// This module contains the core ledger implementation including:
// - Transaction and Block values
// - The proof of work puzzle
// - The chain with validation and conflict resolution
// - The peer registry
// - Identity and hashing utilities

pub mod block;
pub mod chain;
pub mod crypto;
pub mod peers;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Chain, ChainError, ChainSnapshot, ChainValidity};
pub use crypto::{Address, Wallet};
pub use peers::PeerRegistry;
pub use pow::PowError;
pub use transaction::Transaction;
