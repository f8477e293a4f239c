use regex::Regex;
use serde_yaml::Value;
use std::sync::OnceLock;

/// Document-level metadata read from a YAML frontmatter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub status: Option<String>,
}

impl Frontmatter {
    /// `status: publish` (or `published`), case-insensitive
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status.as_deref().is_some_and(|status| {
            let status = status.trim();
            status.eq_ignore_ascii_case("publish") || status.eq_ignore_ascii_case("published")
        })
    }
}

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)")
            .expect("frontmatter regex is valid")
    })
}

/// Split `content` into its frontmatter and the remaining body.
///
/// Content without a leading `---` block yields default frontmatter and the
/// untouched content. Malformed YAML is treated as empty frontmatter, but the
/// block is still stripped from the body.
#[must_use]
pub fn parse_frontmatter(content: &str) -> (Frontmatter, &str) {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return (Frontmatter::default(), content);
    };
    let body_start = captures.get(0).map_or(0, |m| m.end());
    let raw = captures.get(1).map_or("", |m| m.as_str());

    let value = match serde_yaml::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("Ignoring malformed frontmatter: {err}");
            Value::Null
        }
    };

    let frontmatter = match value {
        Value::Mapping(map) => Frontmatter {
            title: map.get("title").and_then(scalar_to_string),
            tags: map.get("tags").map(tags_from_value).unwrap_or_default(),
            status: map.get("status").and_then(scalar_to_string),
        },
        _ => Frontmatter::default(),
    };

    (frontmatter, &content[body_start..])
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}
