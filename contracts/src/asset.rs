//! Sides of the vault and the two swap directions between them.

use serde::{Deserialize, Serialize};

/// One of the two assets a vault holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The first asset, valued at `rate_a`.
    A,
    /// The second asset, valued at `rate_b`.
    B,
}

impl Asset {
    /// The other side of the vault.
    pub fn other(self) -> Self {
        match self {
            Asset::A => Asset::B,
            Asset::B => Asset::A,
        }
    }

    /// Lowercase label used in metrics.
    pub fn label(self) -> &'static str {
        match self {
            Asset::A => "a",
            Asset::B => "b",
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::A => write!(f, "A"),
            Asset::B => write!(f, "B"),
        }
    }
}

/// Direction of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Caller pays A, receives B.
    AtoB,
    /// Caller pays B, receives A.
    BtoA,
}

impl SwapDirection {
    /// The asset the caller pays in.
    pub fn source(self) -> Asset {
        match self {
            SwapDirection::AtoB => Asset::A,
            SwapDirection::BtoA => Asset::B,
        }
    }

    /// The asset the caller receives.
    pub fn destination(self) -> Asset {
        self.source().other()
    }

    /// Snake-case label used in metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SwapDirection::AtoB => "a_to_b",
            SwapDirection::BtoA => "b_to_a",
        }
    }
}

impl std::fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
