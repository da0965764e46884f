use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::crypto::Address;

/// A transfer request waiting in, or sealed into, the ledger.
///
/// Neither the identifiers nor the amount are checked. Negative amounts and
/// self-transfers are accepted as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Sender's identifier
    sender: Address,

    /// Recipient's identifier
    recipient: Address,

    /// Amount being transferred
    amount: f64,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `sender` - The identifier of the sender
    /// * `recipient` - The identifier of the recipient
    /// * `amount` - The amount to transfer
    pub fn new(sender: Address, recipient: Address, amount: f64) -> Self {
        Transaction {
            sender,
            recipient,
            amount,
        }
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}
