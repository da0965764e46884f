use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{Block, ChainSnapshot, ChainValidity};

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The length of the chain
    pub length: usize,

    /// Blocks and pending transactions
    pub chain: ChainSnapshot,

    /// Result of validating the chain
    pub validity: ChainValidity,
}

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's identifier
    pub sender: String,

    /// The recipient's identifier
    pub recipient: String,

    /// The amount to transfer
    pub amount: f64,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,

    /// The index of the block expected to include this transaction
    pub block_index: u64,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly sealed block
    pub block: Block,
}

/// Request for the register node endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterNodeRequest {
    /// The peer's identifier
    pub identifier: String,

    /// The peer's current chain, if known
    #[serde(default)]
    pub chain: Option<ChainSnapshot>,
}

/// Response for the register node endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterNodeResponse {
    /// The message
    pub message: String,

    /// Number of registered peers, the node itself included
    pub total_nodes: usize,
}

/// Response for the resolve endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    /// Whether the local chain was replaced
    pub replaced: bool,

    /// The chain after resolution
    pub chain: ChainSnapshot,
}

/// Response for the wallet endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    /// The node's public address
    pub address: String,
}

/// Error body shared by all endpoints
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
