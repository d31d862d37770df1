//! # Asset Identifiers & Principals
//!
//! Every asset the vault can hold is described by a [`TokenInfo`] with a
//! content-addressed [`AssetId`]. Every party that can own a balance
//! (users, the vault contract itself) is an [`Address`].
//!
//! Asset IDs are BLAKE3 hashes of the token's canonical properties, so the
//! same token always gets the same ID no matter which process registers it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CONTRACT_ADDRESS_BYTES, CONTRACT_ADDRESS_PREFIX};

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a fungible asset.
///
/// Computed as `BLAKE3(name || 0x00 || symbol)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Returns the hex-encoded asset ID.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded asset ID.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives an `AssetId` from the token's name and symbol.
    ///
    /// The `0x00` separator keeps `("ab", "c")` and `("a", "bc")` apart.
    pub fn derive(name: &str, symbol: &str) -> Self {
        let mut preimage = Vec::with_capacity(name.len() + symbol.len() + 1);
        preimage.extend_from_slice(name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(symbol.as_bytes());

        Self(*blake3::hash(&preimage).as_bytes())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for AssetId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An opaque principal identifier: a user account or a contract.
///
/// User addresses are whatever string the surrounding system uses.
/// Contract addresses are derived from a deployment label with
/// [`Address::contract`] so that a redeployed vault keeps its address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps an existing address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Derives the deterministic address of a contract deployed under `label`.
    ///
    /// Format: `pv1` followed by the hex of the first 20 bytes of
    /// `BLAKE3(label)`.
    pub fn contract(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        Self(format!(
            "{}{}",
            CONTRACT_ADDRESS_PREFIX,
            hex::encode(&digest.as_bytes()[..CONTRACT_ADDRESS_BYTES])
        ))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this address was derived with [`Address::contract`].
    pub fn is_contract(&self) -> bool {
        self.0.starts_with(CONTRACT_ADDRESS_PREFIX)
            && self.0.len() == CONTRACT_ADDRESS_PREFIX.len() + CONTRACT_ADDRESS_BYTES * 2
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// TokenInfo
// ---------------------------------------------------------------------------

/// Metadata for a fungible asset.
///
/// `decimals` is for display only. Ledger arithmetic never divides by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Content-addressed identifier derived from `name` and `symbol`.
    pub asset_id: AssetId,
    /// Human-readable name (e.g., "Ajidokwu").
    pub name: String,
    /// Ticker symbol (e.g., "AJI").
    pub symbol: String,
    /// Number of display decimal places.
    pub decimals: u8,
}

impl TokenInfo {
    /// Builds token metadata and derives its [`AssetId`].
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            asset_id: AssetId::derive(name, symbol),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}
