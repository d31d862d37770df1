//! # Liquidity Guard
//!
//! A swap must never start moving funds it cannot finish moving. The guard
//! reads the vault's live reserve of the destination asset and rejects the
//! swap before the inbound pull is issued.

use pairvault_protocol::ledger::{Address, TokenLedger};
use tracing::debug;

use crate::asset::Asset;
use crate::error::VaultError;
use crate::swap_engine::SwapVault;

/// Fails with [`VaultError::InsufficientLiquidity`] if `vault` holds less
/// than `required` on `ledger`. Returns the reserve otherwise.
pub fn assert_sufficient_reserve<L>(ledger: &L, vault: &Address, required: u64) -> Result<u64, VaultError>
where
    L: TokenLedger + ?Sized,
{
    let available = ledger.balance_of(vault);
    if required > available {
        return Err(VaultError::InsufficientLiquidity {
            required,
            available,
        });
    }

    debug!(symbol = ledger.symbol(), required, available, "reserve sufficient");
    Ok(available)
}

impl<L: TokenLedger> SwapVault<L> {
    /// Checks the vault's current reserve of `asset` against `required`.
    ///
    /// Read-only. The swap path runs the same check while it already holds
    /// the ledger locks.
    pub fn assert_sufficient_reserve(&self, asset: Asset, required: u64) -> Result<u64, VaultError> {
        let ledger = self.ledger(asset).read();
        assert_sufficient_reserve(&*ledger, self.vault_address(), required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairvault_protocol::ledger::{FungibleToken, TokenInfo};

    fn funded(amount: u64) -> (FungibleToken, Address) {
        let vault = Address::contract("liquidity-test");
        let mut token = FungibleToken::new(TokenInfo::new("Sabo", "SABO", 18));
        token.mint(&vault, amount).unwrap();
        (token, vault)
    }

    #[test]
    fn exact_reserve_is_enough() {
        let (token, vault) = funded(6666);
        assert_eq!(assert_sufficient_reserve(&token, &vault, 6666).unwrap(), 6666);
    }

    #[test]
    fn short_reserve_rejected() {
        let (token, vault) = funded(100);
        assert!(matches!(
            assert_sufficient_reserve(&token, &vault, 101).unwrap_err(),
            VaultError::InsufficientLiquidity {
                required: 101,
                available: 100
            }
        ));
    }

    #[test]
    fn empty_vault_only_covers_zero() {
        let (token, vault) = funded(0);
        assert!(assert_sufficient_reserve(&token, &vault, 0).is_ok());
        assert!(assert_sufficient_reserve(&token, &vault, 1).is_err());
    }
}
