// Proof of work
//
// A fixed, non-adjustable puzzle: a proof is admitted when the SHA-256 hex of
// `previous_proof * proof` ends in `PROOF_SUFFIX`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use thiserror::Error;

use super::crypto::sha256_hex;

/// Required tail of the hex digest
pub const PROOF_SUFFIX: &str = "dad";

/// Candidates tried between cancellation and deadline checks
const CHECK_INTERVAL: u64 = 1024;

/// Errors that can end a bounded proof search early
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PowError {
    #[error("Proof search cancelled after {tried} candidates")]
    Cancelled { tried: u64 },

    #[error("Proof search timed out after {tried} candidates")]
    TimedOut { tried: u64 },
}

/// Checks whether `proof` solves the puzzle for `previous_proof`
pub fn is_valid_proof(previous_proof: u64, proof: u64) -> bool {
    let guess = (previous_proof as u128 * proof as u128).to_string();
    sha256_hex(&guess).ends_with(PROOF_SUFFIX)
}

/// Finds the smallest proof for `previous_proof`, searching upward from 0.
///
/// Unbounded: blocks the calling thread until a solution is found.
pub fn find_proof(previous_proof: u64) -> u64 {
    let mut proof = 0;

    while !is_valid_proof(previous_proof, proof) {
        proof += 1;
    }

    proof
}

/// Same search as [`find_proof`], but gives up when `cancel` is raised or
/// `deadline` passes.
pub fn find_proof_until(
    previous_proof: u64,
    cancel: &AtomicBool,
    deadline: Option<Instant>,
) -> Result<u64, PowError> {
    let mut proof = 0;

    loop {
        if proof % CHECK_INTERVAL == 0 {
            if cancel.load(Ordering::Relaxed) {
                return Err(PowError::Cancelled { tried: proof });
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(PowError::TimedOut { tried: proof });
            }
        }

        if is_valid_proof(previous_proof, proof) {
            return Ok(proof);
        }

        proof += 1;
    }
}
