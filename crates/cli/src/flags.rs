use clap::ValueEnum;
use notes_retrieval::PairMode;

/// Where embeddings come from
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum EmbedMode {
    /// OpenAI-compatible `/embeddings` endpoint
    #[default]
    Http,
    /// Deterministic offline vectors
    Stub,
}

impl EmbedMode {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            EmbedMode::Http => "http",
            EmbedMode::Stub => "stub",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Some(EmbedMode::Http),
            "stub" => Some(EmbedMode::Stub),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum PairModeFlag {
    Random,
    MaxDissimilarity,
}

impl PairModeFlag {
    pub(crate) const fn as_domain(self) -> PairMode {
        match self {
            PairModeFlag::Random => PairMode::Random,
            PairModeFlag::MaxDissimilarity => PairMode::MaxDissimilarity,
        }
    }
}
