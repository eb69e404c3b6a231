use relay_types::{verifier::StateRootPair, H256};

use crate::error::VerifierError;

/// Position of the first root the two lists disagree on.
pub fn compare_roots(
    batch_index: u64,
    claimed: &[H256],
    independent: &[H256],
) -> Result<Option<usize>, VerifierError> {
    if claimed.len() != independent.len() {
        return Err(VerifierError::CandidateMismatch {
            batch_index,
            claimed: claimed.len(),
            independent: independent.len(),
        });
    }
    let position = claimed
        .iter()
        .zip(independent)
        .enumerate()
        .map(|(k, (claimed_root, independent_root))| StateRootPair {
            index: k as u64,
            claimed_root: *claimed_root,
            independent_root: *independent_root,
        })
        .position(|pair| !pair.is_match());
    Ok(position)
}
