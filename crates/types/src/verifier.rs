use serde::{Deserialize, Serialize};

use crate::H256;

/// A root claimed on L1 next to the root computed independently on L2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateRootPair {
    pub index: u64,
    pub claimed_root: H256,
    pub independent_root: H256,
}

impl StateRootPair {
    pub fn is_match(&self) -> bool {
        self.claimed_root == self.independent_root
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierCursor {
    pub highest_checked_index: Option<u64>,
}

impl VerifierCursor {
    pub fn next_index(&self, start_index: u64) -> u64 {
        match self.highest_checked_index {
            Some(checked) => std::cmp::max(checked + 1, start_index),
            None => start_index,
        }
    }

    /// Record a successful check. Returns false if `index` would not move
    /// the cursor forward.
    pub fn advance(&mut self, index: u64) -> bool {
        match self.highest_checked_index {
            Some(checked) if checked >= index => false,
            _ => {
                self.highest_checked_index = Some(index);
                true
            }
        }
    }
}

/// First height at which two independently computed chains disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergenceRecord {
    pub height: u64,
    pub latest_common_height: u64,
    /// Unix seconds.
    pub detected_at: u64,
    /// Set when an extra probe contradicted the monotonic mismatch
    /// assumption, so `height` may be wrong.
    pub suspicious: bool,
}
