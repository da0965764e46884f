//! A minimal append-only ledger with a proof-of-work admission rule and
//! longest-valid-chain conflict resolution, served over HTTP.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod node;
