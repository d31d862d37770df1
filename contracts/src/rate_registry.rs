//! # Rate Registry
//!
//! Holds the two value anchors of the vault and the one principal allowed
//! to move them.
//!
//! A rate is the stable value of one smallest unit of its asset, so the
//! vault's total stable value is `reserve_a * rate_a + reserve_b * rate_b`
//! and converting `amount` of A yields `amount * rate_a / rate_b` of B.
//!
//! ## Rounding
//!
//! Conversion is integer-only: the product is formed in `u128` and floored
//! by the division. The remainder always stays in the vault.

use pairvault_protocol::config::MIN_RATE;
use pairvault_protocol::ledger::Address;
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, SwapDirection};
use crate::error::VaultError;

/// Converts `amount` between two assets: `floor(amount * from_rate / to_rate)`.
///
/// # Errors
///
/// Returns [`VaultError::InvalidRate`] if `to_rate` is zero and
/// [`VaultError::ArithmeticOverflow`] if the result exceeds `u64::MAX`.
pub fn convert(amount: u64, from_rate: u64, to_rate: u64) -> Result<u64, VaultError> {
    if to_rate == 0 {
        return Err(VaultError::InvalidRate);
    }

    // u64 * u64 always fits in u128.
    let scaled = u128::from(amount) * u128::from(from_rate);
    u64::try_from(scaled / u128::from(to_rate)).map_err(|_| VaultError::ArithmeticOverflow {
        amount,
        from_rate,
        to_rate,
    })
}

/// The owner and the two value anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRegistry {
    owner: Address,
    rate_a: u64,
    rate_b: u64,
}

impl RateRegistry {
    /// Creates a registry. Both rates must be non-zero.
    pub fn new(owner: Address, rate_a: u64, rate_b: u64) -> Result<Self, VaultError> {
        ensure_valid_rate(rate_a)?;
        ensure_valid_rate(rate_b)?;
        Ok(Self {
            owner,
            rate_a,
            rate_b,
        })
    }

    /// The principal allowed to change rates.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Stable value of one unit of A.
    pub fn rate_a(&self) -> u64 {
        self.rate_a
    }

    /// Stable value of one unit of B.
    pub fn rate_b(&self) -> u64 {
        self.rate_b
    }

    /// Rate of one side.
    pub fn rate_of(&self, asset: Asset) -> u64 {
        match asset {
            Asset::A => self.rate_a,
            Asset::B => self.rate_b,
        }
    }

    /// Replaces `rate_a`. Returns the previous value.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] if `caller` is not the owner (checked
    /// first), [`VaultError::InvalidRate`] if `new_rate` is zero.
    pub fn set_rate_a_to_stable(&mut self, caller: &Address, new_rate: u64) -> Result<u64, VaultError> {
        self.set_rate(caller, Asset::A, new_rate)
    }

    /// Replaces `rate_b`. Returns the previous value.
    pub fn set_rate_b_to_stable(&mut self, caller: &Address, new_rate: u64) -> Result<u64, VaultError> {
        self.set_rate(caller, Asset::B, new_rate)
    }

    /// Replaces the rate of `asset` after authorization and validation.
    pub fn set_rate(&mut self, caller: &Address, asset: Asset, new_rate: u64) -> Result<u64, VaultError> {
        self.authorize(caller)?;
        ensure_valid_rate(new_rate)?;

        let slot = match asset {
            Asset::A => &mut self.rate_a,
            Asset::B => &mut self.rate_b,
        };
        Ok(std::mem::replace(slot, new_rate))
    }

    /// Output of swapping `amount` in `direction` at the current rates.
    pub fn quote(&self, direction: SwapDirection, amount: u64) -> Result<u64, VaultError> {
        convert(
            amount,
            self.rate_of(direction.source()),
            self.rate_of(direction.destination()),
        )
    }

    fn authorize(&self, caller: &Address) -> Result<(), VaultError> {
        if caller != &self.owner {
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}

fn ensure_valid_rate(rate: u64) -> Result<(), VaultError> {
    if rate < MIN_RATE {
        return Err(VaultError::InvalidRate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RateRegistry {
        RateRegistry::new(Address::from("owner"), 2, 3).unwrap()
    }

    #[test]
    fn convert_floors() {
        assert_eq!(convert(10_000, 2, 3).unwrap(), 6666);
        assert_eq!(convert(6666, 3, 2).unwrap(), 9999);
        assert_eq!(convert(1, 2, 3).unwrap(), 0);
        assert_eq!(convert(0, 2, 3).unwrap(), 0);
    }

    #[test]
    fn convert_uses_wide_intermediate() {
        // amount * rate overflows u64, the quotient does not.
        assert_eq!(convert(u64::MAX, 4, 8).unwrap(), u64::MAX / 2);
    }

    #[test]
    fn convert_rejects_overflowing_result() {
        assert!(matches!(
            convert(u64::MAX, 3, 2).unwrap_err(),
            VaultError::ArithmeticOverflow {
                from_rate: 3,
                to_rate: 2,
                ..
            }
        ));
    }

    #[test]
    fn convert_rejects_zero_divisor() {
        assert!(matches!(convert(1, 1, 0).unwrap_err(), VaultError::InvalidRate));
    }

    #[test]
    fn zero_rate_rejected_at_construction() {
        assert!(matches!(
            RateRegistry::new(Address::from("owner"), 0, 3).unwrap_err(),
            VaultError::InvalidRate
        ));
        assert!(matches!(
            RateRegistry::new(Address::from("owner"), 2, 0).unwrap_err(),
            VaultError::InvalidRate
        ));
    }

    #[test]
    fn owner_can_set_rates() {
        let mut r = registry();
        assert_eq!(r.set_rate_a_to_stable(&Address::from("owner"), 4).unwrap(), 2);
        assert_eq!(r.set_rate_b_to_stable(&Address::from("owner"), 5).unwrap(), 3);
        assert_eq!((r.rate_a(), r.rate_b()), (4, 5));
    }

    #[test]
    fn stranger_cannot_set_rates() {
        let mut r = registry();
        let err = r
            .set_rate_a_to_stable(&Address::from("mallory"), 9)
            .unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
        assert_eq!(r.rate_a(), 2);
    }

    #[test]
    fn authorization_checked_before_value() {
        let mut r = registry();
        assert!(matches!(
            r.set_rate_b_to_stable(&Address::from("mallory"), 0)
                .unwrap_err(),
            VaultError::Unauthorized { .. }
        ));
    }

    #[test]
    fn owner_cannot_zero_a_rate() {
        let mut r = registry();
        assert!(matches!(
            r.set_rate_b_to_stable(&Address::from("owner"), 0)
                .unwrap_err(),
            VaultError::InvalidRate
        ));
        assert_eq!(r.rate_b(), 3);
    }

    #[test]
    fn quote_follows_direction() {
        let r = registry();
        assert_eq!(r.quote(SwapDirection::AtoB, 10_000).unwrap(), 6666);
        assert_eq!(r.quote(SwapDirection::BtoA, 10_000).unwrap(), 15_000);
    }
}
