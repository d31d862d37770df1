//! # Vault Events
//!
//! Every successful state change appends exactly one [`VaultEvent`] to the
//! vault's log. Failed operations append nothing.
//!
//! Swap events keep the argument shape `(amount, symbol, "to", out_amount)`
//! that indexers of the vault already decode; [`VaultEventKind::swap_args`]
//! returns it.

use chrono::{DateTime, Utc};
use pairvault_protocol::config::EVENT_SEPARATOR;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::{Asset, SwapDirection};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEventKind {
    /// A caller paid `amount` of A (`symbol`) and received `out_amount` of B.
    SwapAtoBCompleted {
        /// Units of A paid in.
        amount: u64,
        /// Symbol of the source asset.
        symbol: String,
        /// Units of B paid out.
        out_amount: u64,
    },
    /// A caller paid `amount` of B (`symbol`) and received `out_amount` of A.
    SwapBtoACompleted {
        /// Units of B paid in.
        amount: u64,
        /// Symbol of the source asset.
        symbol: String,
        /// Units of A paid out.
        out_amount: u64,
    },
    /// The owner changed a value anchor.
    RateUpdated {
        /// Which side.
        asset: Asset,
        /// Rate before the change.
        old_rate: u64,
        /// Rate after the change.
        new_rate: u64,
    },
}

impl VaultEventKind {
    /// Builds the completion event for a swap in `direction`.
    pub fn swap_completed(direction: SwapDirection, amount: u64, symbol: &str, out_amount: u64) -> Self {
        let symbol = symbol.to_string();
        match direction {
            SwapDirection::AtoB => VaultEventKind::SwapAtoBCompleted {
                amount,
                symbol,
                out_amount,
            },
            SwapDirection::BtoA => VaultEventKind::SwapBtoACompleted {
                amount,
                symbol,
                out_amount,
            },
        }
    }

    /// Event name as indexed.
    pub fn name(&self) -> &'static str {
        match self {
            VaultEventKind::SwapAtoBCompleted { .. } => "SwapAtoBCompleted",
            VaultEventKind::SwapBtoACompleted { .. } => "SwapBtoACompleted",
            VaultEventKind::RateUpdated { .. } => "RateUpdated",
        }
    }

    /// `(amount, symbol, "to", out_amount)` for swap events, `None` otherwise.
    pub fn swap_args(&self) -> Option<(u64, &str, &'static str, u64)> {
        match self {
            VaultEventKind::SwapAtoBCompleted {
                amount,
                symbol,
                out_amount,
            }
            | VaultEventKind::SwapBtoACompleted {
                amount,
                symbol,
                out_amount,
            } => Some((*amount, symbol.as_str(), EVENT_SEPARATOR, *out_amount)),
            VaultEventKind::RateUpdated { .. } => None,
        }
    }
}

/// One entry of the vault's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Unique identifier of this emission.
    pub event_id: Uuid,
    /// Position in the vault's log, starting at 0.
    pub sequence: u64,
    /// When the event was emitted.
    pub emitted_at: DateTime<Utc>,
    /// The payload.
    pub kind: VaultEventKind,
}

/// Append-only log of emitted events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<VaultEvent>,
    next_sequence: u64,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns a copy of what was recorded.
    pub fn emit(&mut self, kind: VaultEventKind) -> VaultEvent {
        let event = VaultEvent {
            event_id: Uuid::new_v4(),
            sequence: self.next_sequence,
            emitted_at: Utc::now(),
            kind,
        };
        self.next_sequence += 1;
        self.events.push(event.clone());
        event
    }

    /// All events not yet drained, oldest first.
    pub fn all(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Removes and returns all buffered events. Sequence numbers keep
    /// counting from where they were.
    pub fn drain(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
