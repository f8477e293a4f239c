use notes_chunker::{Chunker, ChunkerConfig, NoteChunk};
use proptest::prelude::*;

fn chunk(source_id: &str, content: &str) -> Vec<NoteChunk> {
    let config = ChunkerConfig {
        chunk_size: 120,
        chunk_overlap: 20,
        ..ChunkerConfig::default()
    };
    Chunker::new(config)
        .expect("valid config")
        .chunk(source_id, content)
        .expect("chunking failed")
}

#[test]
fn every_word_survives_chunking() {
    let mut content = String::from("---\ntitle: Coverage\n---\n");
    for section in 0..6 {
        content.push_str(&format!("## Section {section}\n"));
        for line in 0..8 {
            content.push_str(&format!("section{section} line{line} carries some filler words\n"));
        }
    }

    let chunks = chunk("coverage.md", &content);
    let joined: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n");
    // frontmatter feeds metadata only; every body word is kept
    for word in content.lines().skip(3).flat_map(str::split_whitespace) {
        assert!(joined.contains(word), "word {word:?} dropped");
    }
    assert!(!joined.contains("title:"));
    assert!(!joined.contains("---"));
    assert!(chunks.iter().all(|c| c.display_title == "Coverage"));
}

#[test]
fn order_restarts_per_heading_segment() {
    let content = "# One\nalpha\n# Two\nbeta\n# Three\ngamma";
    let chunks = chunk("dense.md", content);
    let orders: Vec<usize> = chunks.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![0, 0, 0]);
    assert!(chunks.iter().all(|c| c.sibling_count == 1));

    let long = "word ".repeat(60);
    let content = format!("# Long\n{long}\n# Short\ntail");
    let chunks = chunk("mixed.md", &content);
    let (short, long): (Vec<&NoteChunk>, Vec<&NoteChunk>) =
        chunks.iter().partition(|c| c.headings == ["Short"]);
    assert!(long.len() > 1);
    for (idx, c) in long.iter().enumerate() {
        assert_eq!(c.order, idx);
        assert_eq!(c.sibling_count, long.len());
    }
    assert_eq!(short.len(), 1);
    assert_eq!((short[0].order, short[0].sibling_count), (0, 1));
}

proptest! {
    #[test]
    fn chunks_are_bounded_and_cover_words(
        words in proptest::collection::vec("[a-z]{1,12}", 1..200),
        heading_every in 5usize..40,
    ) {
        let mut content = String::new();
        for (idx, word) in words.iter().enumerate() {
            if idx % heading_every == 0 {
                content.push_str(&format!("\n# H{idx}\n"));
            }
            content.push_str(word);
            content.push(if idx % 7 == 0 { '\n' } else { ' ' });
        }

        let chunks = chunk("prop.md", &content);
        prop_assert!(!chunks.is_empty());
        for c in &chunks {
            prop_assert!(c.text.chars().count() <= 120);
            prop_assert!(!c.text.trim().is_empty());
            prop_assert!(c.order < c.sibling_count);
            prop_assert!(c.text.contains('\n') || !c.text.starts_with("# H"));
        }
        for pair in chunks.windows(2) {
            let next_in_segment = pair[1].order == pair[0].order + 1
                && pair[1].sibling_count == pair[0].sibling_count;
            let segment_starts = pair[1].order == 0 && pair[0].order + 1 == pair[0].sibling_count;
            prop_assert!(next_in_segment || segment_starts);
        }
        for word in &words {
            prop_assert!(chunks.iter().any(|c| c.text.contains(word.as_str())));
        }
    }
}
