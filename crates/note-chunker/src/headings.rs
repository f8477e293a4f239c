use regex::Regex;
use std::sync::OnceLock;

/// A heading-bounded slice of a markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Segment text, starting with its heading line when it has one
    pub text: &'a str,
    /// Heading trail in force for this segment (outermost first)
    pub headings: Vec<String>,
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t#]*\r?\n?$").expect("heading regex is valid")
    })
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

/// Split `body` on ATX headings up to `max_level`, keeping each heading line
/// at the head of its segment. Lines inside fenced code blocks never split.
/// Whitespace-only segments are skipped.
pub fn split_by_headings(body: &str, max_level: usize) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut trail: Vec<Option<String>> = vec![None; 6];
    let mut current_trail: Vec<String> = Vec::new();
    let mut segment_start = 0usize;
    let mut offset = 0usize;
    let mut open_fence: Option<&'static str> = None;

    for line in body.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if let Some(marker) = fence_marker(line) {
            open_fence = match open_fence {
                Some(open) if open == marker => None,
                Some(open) => Some(open),
                None => Some(marker),
            };
            continue;
        }
        if open_fence.is_some() {
            continue;
        }

        let Some(captures) = heading_regex().captures(line) else {
            continue;
        };
        let level = captures.get(1).map_or(0, |m| m.as_str().len());
        if level == 0 || level > max_level {
            continue;
        }

        push_segment(&mut segments, &body[segment_start..line_start], &current_trail);
        segment_start = line_start;

        let title = captures.get(2).map_or("", |m| m.as_str()).trim().to_string();
        trail[level - 1] = Some(title);
        for slot in trail.iter_mut().skip(level) {
            *slot = None;
        }
        current_trail = trail.iter().flatten().cloned().collect();
    }

    push_segment(&mut segments, &body[segment_start..], &current_trail);
    segments
}

fn push_segment<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, trail: &[String]) {
    if text.trim().is_empty() {
        return;
    }
    segments.push(Segment {
        text,
        headings: trail.to_vec(),
    });
}
