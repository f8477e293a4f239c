use crate::error::{Result, RetrievalError};
use crate::pools::{ensure_enough, file_level_pool, shorter_pool, MIN_ENTRIES};
use notes_vector_store::{cosine_similarity, IndexEntry};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How the two notes of a pair are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairMode {
    /// Uniform sample from the short, one-per-document pool
    #[default]
    Random,
    /// Random anchor plus the entry least similar to it
    MaxDissimilarity,
}

impl PairMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::MaxDissimilarity => "max-dissimilarity",
        }
    }
}

impl fmt::Display for PairMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PairMode {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "max-dissimilarity" | "max_dissimilarity" | "mmr" => Ok(Self::MaxDissimilarity),
            other => Err(RetrievalError::UnknownMode(other.to_string())),
        }
    }
}

/// Pick two distinct entry indices from `entries`.
///
/// `cap` bounds the shortest-first fallback of the length pool.
pub fn pick_pair<R: Rng + ?Sized>(
    entries: &[IndexEntry],
    mode: PairMode,
    cap: usize,
    rng: &mut R,
) -> Result<(usize, usize)> {
    ensure_enough(entries)?;
    match mode {
        PairMode::Random => pick_random(entries, cap, rng),
        PairMode::MaxDissimilarity => Ok(pick_dissimilar(entries, rng)),
    }
}

fn pick_random<R: Rng + ?Sized>(
    entries: &[IndexEntry],
    cap: usize,
    rng: &mut R,
) -> Result<(usize, usize)> {
    let files = file_level_pool(entries)?;
    let shorter = shorter_pool(entries, cap)?;

    let short_set: HashSet<usize> = shorter.iter().copied().collect();
    let both: Vec<usize> = files
        .iter()
        .copied()
        .filter(|idx| short_set.contains(idx))
        .collect();

    let all: Vec<usize> = (0..entries.len()).collect();
    let pool = [&both, &files, &shorter, &all]
        .into_iter()
        .find(|pool| pool.len() >= MIN_ENTRIES)
        .unwrap_or(&all);
    log::debug!(
        "Random pair from pool of {} (intersection {}, files {}, shorter {})",
        pool.len(),
        both.len(),
        files.len(),
        shorter.len()
    );

    Ok(sample_two(pool, rng))
}

fn pick_dissimilar<R: Rng + ?Sized>(entries: &[IndexEntry], rng: &mut R) -> (usize, usize) {
    let anchor = rng.gen_range(0..entries.len());
    let anchor_vector = &entries[anchor].embedding;

    let farthest = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let similarity = if idx == anchor {
                f32::INFINITY
            } else {
                cosine_similarity(anchor_vector, &entry.embedding)
            };
            (idx, similarity)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx);

    match farthest {
        Some(other) if other != anchor => (anchor, other),
        _ => {
            log::debug!("Degenerate dissimilarity pair; sampling uniformly");
            let all: Vec<usize> = (0..entries.len()).collect();
            sample_two(&all, rng)
        }
    }
}

/// Two distinct members of `pool`, which must hold at least two items.
fn sample_two<R: Rng + ?Sized>(pool: &[usize], rng: &mut R) -> (usize, usize) {
    let picked = index::sample(rng, pool.len(), 2);
    (pool[picked.index(0)], pool[picked.index(1)])
}
