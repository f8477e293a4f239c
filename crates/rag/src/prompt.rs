//! Prompt text for question answering and concept collision.

use notes_vector_store::SearchHit;

pub const DEFAULT_PERSONA: &str = "You are a knowledge-base assistant. Answer questions using the \
provided notes and finish your answer with the citation numbers you relied on, for example [1][2].";

pub const GROUNDING_INSTRUCTION: &str = "The relevant note excerpts follow. Answer strictly from \
that information and append the citation numbers at the end of your answer.";

pub const UNTITLED: &str = "Untitled";

/// Characters of chunk text kept in a citation
pub const SNIPPET_CHARS: usize = 400;

/// Characters of note text handed to the collision prompt
pub const COLLISION_NOTE_CHARS: usize = 800;

pub const COLLISION_SYSTEM_PROMPT: &str = "You are an insightful technical editor and innovation \
consultant. Your task is concept synthesis: read two unrelated notes supplied by the user, find \
their underlying logical commonality, complementarity or tension, and derive a new creative topic \
from it.";

/// `[i] title (source)\ntext` per hit, 1-based, separated by blank lines
#[must_use]
pub fn context_block(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(idx, hit)| {
            format!(
                "[{}] {} ({})\n{}",
                idx + 1,
                title_or_untitled(&hit.title),
                hit.source_id,
                hit.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Persona (or the default), plus the grounding instruction and context
/// block when there is any context.
#[must_use]
pub fn system_prompt(persona: Option<&str>, context: &str) -> String {
    let persona = persona
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PERSONA);
    if context.is_empty() {
        return persona.to_string();
    }
    format!("{persona}\n{GROUNDING_INSTRUCTION}\n\n{context}")
}

#[must_use]
pub fn collision_user_prompt(first: &str, second: &str, hint: Option<&str>) -> String {
    let hint = hint
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| format!("[Hint] Use this angle as a catalyst for the collision:\n{h}\n---\n"))
        .unwrap_or_default();
    format!(
        "[Note A]: {first}\n---\n[Note B]: {second}\n---\n{hint}\
Based on these two notes:\n\
1. Connection: in one sentence, explain an abstract link between A and B \
(structural similarity, mutual metaphor, problem and method).\n\
2. Title: propose a compelling article title or project name.\n\
3. Outline: list 3 key points on how A's technique or idea can solve a problem in B's domain, \
or the other way round.\n\
Reply in JSON: {{\"connection\": \"...\", \"title\": \"...\", \"outline\": [\"point1\", \"point2\", \"point3\"]}}"
    )
}

/// First `max_chars` characters of `text`
#[must_use]
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// `text` cut to `max_chars` characters with a trailing `...` when cut
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

pub(crate) fn title_or_untitled(title: &str) -> &str {
    if title.trim().is_empty() {
        UNTITLED
    } else {
        title
    }
}
