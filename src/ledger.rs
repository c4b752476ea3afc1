//! Read-side ledger accessors packaged for handlers.

use crate::store::{BacklogStore, StoreError, TokenInfo};
use crate::types::Address;

/// One token's share of an account's unconfirmed backlog, with the ledger
/// metadata resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSummary {
    pub info: TokenInfo,
    pub total_amount: u128,
}

/// Aggregate unconfirmed view of one account, ready for display or RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfirmedAccount {
    pub address: Address,
    pub total_number: u64,
    pub tokens: Vec<TokenSummary>,
}

/// Build the unconfirmed summary for `address`, resolving every token id in
/// its metadata against the ledger's token registry.
pub fn unconfirmed_account(
    store: &dyn BacklogStore,
    address: Address,
) -> Result<UnconfirmedAccount, StoreError> {
    let meta = store.unconfirmed_meta(address)?;
    let mut tokens = Vec::with_capacity(meta.tokens.len());
    for token_meta in &meta.tokens {
        let info = store.token_info(token_meta.token)?;
        tokens.push(TokenSummary {
            info,
            total_amount: token_meta.total_amount,
        });
    }
    Ok(UnconfirmedAccount {
        address,
        total_number: meta.total_number,
        tokens,
    })
}
