use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle classification of a loan asset.
///
/// Discriminants are the stable integer codes used by external tooling;
/// `REDEEMED` is terminal.
///
/// | From     | Allowed To        |
/// |----------|-------------------|
/// | ISSUED   | PENDING, TRADING  |
/// | PENDING  | ISSUED, TRADING   |
/// | TRADING  | REDEEMED          |
/// | REDEEMED | (none)            |
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetState {
    /// Loan has been issued by its lender. Newly created assets start here,
    /// as do records persisted before the state field was stored.
    #[default]
    Issued = 1,
    /// Loan is pending.
    Pending = 2,
    /// Loan is trading.
    Trading = 3,
    /// Loan has been redeemed.
    Redeemed = 4,
}

const NAMES: [&str; 4] = ["ISSUED", "PENDING", "TRADING", "REDEEMED"];

impl AssetState {
    /// All states in code order.
    pub const ALL: [AssetState; 4] = [
        Self::Issued,
        Self::Pending,
        Self::Trading,
        Self::Redeemed,
    ];

    /// The stable integer code (1..=4).
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Look up a state by integer code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Issued),
            2 => Some(Self::Pending),
            3 => Some(Self::Trading),
            4 => Some(Self::Redeemed),
            _ => None,
        }
    }

    /// Fixed display name.
    pub fn name(self) -> &'static str {
        NAMES[self.code() as usize - 1]
    }

    /// States reachable from `self` in one step.
    pub fn successors(self) -> &'static [AssetState] {
        match self {
            Self::Issued => &[Self::Pending, Self::Trading],
            Self::Pending => &[Self::Issued, Self::Trading],
            Self::Trading => &[Self::Redeemed],
            Self::Redeemed => &[],
        }
    }

    pub fn can_transition_to(self, to: AssetState) -> bool {
        self.successors().contains(&to)
    }

    /// Returns `true` once no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Validate a move to `to` against the transition table.
    pub fn transition(self, to: AssetState) -> Result<AssetState, TypeError> {
        if self.is_terminal() {
            return Err(TypeError::Terminal { state: self });
        }
        if !self.can_transition_to(to) {
            return Err(TypeError::IllegalTransition { from: self, to });
        }
        Ok(to)
    }
}

/// Display name for a raw state code.
///
/// Codes outside the defined range map to `"UNKNOWN"` so that records written
/// by newer producers still render.
pub fn state_name(code: u32) -> &'static str {
    AssetState::from_code(code).map_or("UNKNOWN", AssetState::name)
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetState {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|state| state.name() == upper)
            .ok_or_else(|| TypeError::UnknownState(s.to_string()))
    }
}
