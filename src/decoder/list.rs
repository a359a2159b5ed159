//! List decoding by flipping unreliable bits.
//!
//! After message passing, the information bits whose marginal LLRs have the
//! smallest magnitude are the least reliable. A list of candidates is formed
//! from the hard decision by flipping every combination of the `m` least
//! reliable bits, giving `2^m` candidates. The candidates are not ordered by
//! likelihood: the first one is the hard decision, and each flipped bit
//! appends a copy of the current list with that bit inverted.

use super::Error;
use crate::graph::TannerGraph;

/// Returns the number of bits that are flipped for a list size.
///
/// This is `floor(log2(list_size))`.
///
/// # Errors
/// [`Error::InvalidListSize`] is returned if `list_size` is zero, and
/// [`Error::ListSizeTooLarge`] if more bits would be flipped than there are
/// information bits.
pub fn ambiguous_bit_count(list_size: usize, information_bits: usize) -> Result<usize, Error> {
    let count = list_size.checked_ilog2().ok_or(Error::InvalidListSize)? as usize;
    if count > information_bits {
        return Err(Error::ListSizeTooLarge {
            list_size,
            information_bits,
        });
    }
    Ok(count)
}

/// Ranks the information bits by reliability.
///
/// Returns positions in the information bit vector, sorted by increasing
/// magnitude of the marginal LLR. Bits with equal magnitude keep their order.
pub(crate) fn rank_by_reliability(graph: &TannerGraph) -> Vec<usize> {
    let magnitudes = graph
        .information_bits()
        .iter()
        .map(|&v| graph.marginal_llr(v).abs())
        .collect::<Vec<_>>();
    let mut positions = (0..magnitudes.len()).collect::<Vec<_>>();
    positions.sort_by(|&a, &b| magnitudes[a].total_cmp(&magnitudes[b]));
    positions
}

/// Expands a hard decision into a list of candidates.
///
/// For each position in `flips`, the current list is doubled by appending a
/// copy of every candidate with the bit in that position inverted.
pub(crate) fn expand_candidates(decision: Vec<u8>, flips: &[usize]) -> Vec<Vec<u8>> {
    let mut candidates = Vec::with_capacity(1 << flips.len());
    candidates.push(decision);
    for &position in flips {
        let flipped = candidates
            .iter()
            .map(|candidate| {
                let mut candidate = candidate.clone();
                candidate[position] ^= 1;
                candidate
            })
            .collect::<Vec<_>>();
        candidates.extend(flipped);
    }
    candidates
}

/// Selects the candidate that best agrees with a set of LLRs.
///
/// The LLRs must be aligned with the candidate bits (typically, these are the
/// channel LLRs of the information bits). Each candidate is scored by the sum
/// of the magnitudes of the LLRs whose sign disagrees with the candidate bit,
/// and the index of the candidate with the lowest score is returned. Ties go
/// to the earliest candidate. `None` is returned if there are no candidates.
///
/// # Examples
/// ```
/// # use ldpc_list_decoder::decoder::list::select_best_candidate;
/// let candidates = vec![vec![0, 0], vec![1, 0], vec![0, 1]];
/// assert_eq!(select_best_candidate(&candidates, &[-2.0, 0.5]), Some(1));
/// ```
pub fn select_best_candidate(candidates: &[Vec<u8>], llrs: &[f64]) -> Option<usize> {
    candidates
        .iter()
        .map(|candidate| {
            candidate
                .iter()
                .zip(llrs.iter())
                .filter(|(&bit, &llr)| (bit == 1) != (llr < 0.0))
                .map(|(_, llr)| llr.abs())
                .sum::<f64>()
        })
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(j, _)| j)
}
