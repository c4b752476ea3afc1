//! JSON-RPC error mapping for ledger and wallet failures.
//!
//! Internal errors that RPC clients are expected to branch on get a stable
//! numeric code; everything else passes through untouched.

use thiserror::Error;

/// A coded error as surfaced over JSON-RPC.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct JsonRpcError {
    pub message: String,
    pub code: i32,
}

impl JsonRpcError {
    pub fn new(message: impl Into<String>, code: i32) -> JsonRpcError {
        JsonRpcError {
            message: message.into(),
            code,
        }
    }
}

pub const MSG_BALANCE_NOT_ENOUGH: &str = "the balance is not enough";
pub const MSG_DECRYPT_KEY: &str = "error decrypt key";
pub const MSG_ALREADY_UNLOCKED: &str = "the address was previously unlocked";
pub const MSG_NOT_SUPPORT: &str = "not support this method";

/// Errors whose message clients match on, with their assigned codes.
const CONCERNED: &[(&str, i32)] = &[
    (MSG_DECRYPT_KEY, 4001),
    (MSG_ALREADY_UNLOCKED, 4002),
    (MSG_BALANCE_NOT_ENOUGH, 5001),
];

/// Map an internal error to its coded RPC form if it is one of the concerned
/// errors; `None` means the caller should forward the error as-is.
pub fn try_make_concerned(error: &(dyn std::error::Error + 'static)) -> Option<JsonRpcError> {
    let message = error.to_string();
    CONCERNED
        .iter()
        .find(|(known, _)| *known == message)
        .map(|(known, code)| JsonRpcError::new(*known, *code))
}
