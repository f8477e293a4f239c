use crate::error::{Result, RetrievalError};
use notes_vector_store::IndexEntry;
use std::collections::HashSet;

/// Default number of entries kept by the shortest-first fallback
pub const DEFAULT_SHORTER_CAP: usize = 50;

/// Entries up to this multiple of the median length count as "short"
pub const LENGTH_RATIO: f64 = 1.2;

/// Pools and pairing need two distinct entries
pub const MIN_ENTRIES: usize = 2;

pub(crate) fn ensure_enough(entries: &[IndexEntry]) -> Result<()> {
    if entries.len() < MIN_ENTRIES {
        return Err(RetrievalError::InsufficientData {
            required: MIN_ENTRIES,
            available: entries.len(),
        });
    }
    Ok(())
}

/// One representative index per source document; the first chunk seen wins.
///
/// Indices are returned in entry order.
pub fn file_level_pool(entries: &[IndexEntry]) -> Result<Vec<usize>> {
    ensure_enough(entries)?;
    let mut seen = HashSet::new();
    Ok(entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| seen.insert(entry.source_id()))
        .map(|(idx, _)| idx)
        .collect())
}

/// Indices of entries whose text is at most [`LENGTH_RATIO`] times the median
/// length, in entry order.
///
/// If fewer than two entries qualify, falls back to the `cap` shortest entries
/// (ties broken by position).
pub fn shorter_pool(entries: &[IndexEntry], cap: usize) -> Result<Vec<usize>> {
    ensure_enough(entries)?;
    let lengths: Vec<usize> = entries.iter().map(|e| e.chunk.char_len()).collect();

    let median = median(&lengths);
    let threshold = if median > 0.0 {
        median * LENGTH_RATIO
    } else {
        1.0
    };

    let qualified: Vec<usize> = lengths
        .iter()
        .enumerate()
        .filter(|(_, &len)| len as f64 <= threshold)
        .map(|(idx, _)| idx)
        .collect();
    if qualified.len() >= MIN_ENTRIES {
        return Ok(qualified);
    }

    log::debug!(
        "Only {} entries under length threshold {threshold:.1}; using shortest {cap}",
        qualified.len()
    );
    let mut by_length: Vec<usize> = (0..entries.len()).collect();
    by_length.sort_by_key(|&idx| (lengths[idx], idx));
    by_length.truncate(cap.max(MIN_ENTRIES));
    Ok(by_length)
}

/// Median of `values`; the mean of the two middle values for even counts.
fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}
