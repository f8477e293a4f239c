use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
enum Separator<'s> {
    Literal(&'s str),
    /// Last resort: every character is a break point.
    Char,
}

/// Recursive, size-bounded text splitter.
///
/// Text is cut at the highest-priority separator it contains; pieces that are
/// still too large are split again with the remaining separators. Adjacent
/// small pieces are then merged back up to `chunk_size` characters, carrying
/// up to `chunk_overlap` characters from the end of one chunk into the next.
/// Separators stay attached to the start of the piece that follows them.
pub struct RecursiveSplitter<'s> {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<Separator<'s>>,
}

impl<'s> RecursiveSplitter<'s> {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &'s [String]) -> Self {
        let mut seps: Vec<Separator<'s>> = separators
            .iter()
            .map(|s| Separator::Literal(s.as_str()))
            .collect();
        seps.push(Separator::Char);
        Self {
            chunk_size,
            chunk_overlap,
            separators: seps,
        }
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.split_recursive(text, &self.separators, &mut out);
        out
    }

    fn split_recursive(&self, text: &str, separators: &[Separator<'s>], out: &mut Vec<String>) {
        let (separator, rest) = pick_separator(text, separators);
        let pieces = split_keep_start(text, separator);

        let mut good: Vec<(&str, usize)> = Vec::new();
        for piece in pieces {
            let len = piece.chars().count();
            if len < self.chunk_size {
                good.push((piece, len));
                continue;
            }
            if !good.is_empty() {
                self.merge(&good, out);
                good.clear();
            }
            if rest.is_empty() {
                push_trimmed(out, piece.to_string());
            } else {
                self.split_recursive(piece, rest, out);
            }
        }
        if !good.is_empty() {
            self.merge(&good, out);
        }
    }

    fn merge(&self, pieces: &[(&str, usize)], out: &mut Vec<String>) {
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &(piece, len) in pieces {
            if total + len > self.chunk_size && !current.is_empty() {
                push_trimmed(out, join(&current));
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    let Some((_, dropped)) = current.pop_front() else {
                        break;
                    };
                    total -= dropped;
                }
            }
            current.push_back((piece, len));
            total += len;
        }

        if !current.is_empty() {
            push_trimmed(out, join(&current));
        }
    }
}

fn pick_separator<'a, 's>(
    text: &str,
    separators: &'a [Separator<'s>],
) -> (Separator<'s>, &'a [Separator<'s>]) {
    for (idx, separator) in separators.iter().enumerate() {
        match separator {
            Separator::Char => return (Separator::Char, &[]),
            Separator::Literal(s) if text.contains(s) => {
                return (*separator, &separators[idx + 1..]);
            }
            Separator::Literal(_) => {}
        }
    }
    (Separator::Char, &[])
}

fn split_keep_start<'t>(text: &'t str, separator: Separator<'_>) -> Vec<&'t str> {
    let mut cuts: Vec<usize> = match separator {
        Separator::Char => text.char_indices().map(|(idx, _)| idx).collect(),
        Separator::Literal(s) => text.match_indices(s).map(|(idx, _)| idx).collect(),
    };
    cuts.push(text.len());

    let mut pieces = Vec::with_capacity(cuts.len());
    let mut start = 0usize;
    for cut in cuts {
        if cut > start {
            pieces.push(&text[start..cut]);
        }
        start = cut;
    }
    pieces
}

fn join(pieces: &VecDeque<(&str, usize)>) -> String {
    let mut joined = String::with_capacity(pieces.iter().map(|(p, _)| p.len()).sum());
    for (piece, _) in pieces {
        joined.push_str(piece);
    }
    joined
}

fn push_trimmed(out: &mut Vec<String>, text: String) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    if trimmed.len() == text.len() {
        out.push(text);
    } else {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkerConfig;

    fn splitter(config: &ChunkerConfig) -> RecursiveSplitter<'_> {
        RecursiveSplitter::new(config.chunk_size, config.chunk_overlap, &config.separators)
    }

    #[test]
    fn short_text_is_one_chunk() {
        let config = ChunkerConfig::default();
        let chunks = splitter(&config).split("  hello world  ");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn long_text_respects_size_and_word_boundaries() {
        let config = ChunkerConfig {
            chunk_size: 50,
            chunk_overlap: 10,
            ..Default::default()
        };
        let text = (0..60)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = splitter(&config).split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {chunk:?}");
            for word in chunk.split(' ') {
                assert!(word.starts_with("word"), "split inside a word: {word:?}");
            }
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let config = ChunkerConfig {
            chunk_size: 40,
            chunk_overlap: 15,
            ..Default::default()
        };
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn oo pp qq rr ss tt uu vv";
        let chunks = splitter(&config).split(text);
        assert!(chunks.len() >= 2);
        let first_tail = chunks[0].split(' ').last().unwrap();
        assert!(chunks[1].contains(first_tail));
    }

    #[test]
    fn prefers_newlines_over_spaces() {
        let config = ChunkerConfig {
            chunk_size: 30,
            chunk_overlap: 0,
            ..Default::default()
        };
        let text = "first line is here\nsecond line is here\nthird line is here";
        let chunks = splitter(&config).split(text);
        assert_eq!(
            chunks,
            vec![
                "first line is here".to_string(),
                "second line is here".to_string(),
                "third line is here".to_string(),
            ]
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let config = ChunkerConfig {
            chunk_size: 10,
            chunk_overlap: 2,
            ..Default::default()
        };
        let text = "x".repeat(35);
        let chunks = splitter(&config).split(&text);
        assert!(chunks.len() >= 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let config = ChunkerConfig {
            chunk_size: 8,
            chunk_overlap: 2,
            ..Default::default()
        };
        let text = "知识库知识库知识库知识库知识库";
        let chunks = splitter(&config).split(text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert!(chunks.concat().contains('库'));
    }
}
