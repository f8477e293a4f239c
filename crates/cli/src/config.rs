use anyhow::{Context, Result};
use notes_indexer::{ScanOptions, DEFAULT_FILE_GLOB};
use notes_vector_store::IndexPaths;
use std::env;
use std::path::PathBuf;

use crate::flags::EmbedMode;

pub(crate) const ENV_NOTES_ROOT: &str = "NOTE_LOCAL_PATH";
pub(crate) const ENV_INDEX_DIR: &str = "NOTES_INDEX_DIR";
pub(crate) const ENV_FILE_GLOB: &str = "NOTE_FILE_GLOB";
pub(crate) const ENV_ONLY_PUBLISHED: &str = "NOTE_ONLY_PUBLISHED";
pub(crate) const ENV_EMBEDDING_MODE: &str = "NOTES_EMBEDDING_MODE";

/// Values given on the command line; each wins over its environment variable
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigOverrides {
    pub notes_root: Option<PathBuf>,
    pub index_dir: Option<PathBuf>,
    pub glob: Option<String>,
    pub only_published: bool,
    pub embed_mode: Option<EmbedMode>,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub notes_root: PathBuf,
    pub index: IndexPaths,
    pub scan: ScanOptions,
    pub embed_mode: EmbedMode,
}

impl AppConfig {
    pub(crate) fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    fn resolve_with<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let notes_root = overrides
            .notes_root
            .or_else(|| lookup(ENV_NOTES_ROOT).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let notes_root = notes_root
            .canonicalize()
            .with_context(|| format!("Invalid notes path {}", notes_root.display()))?;

        let index = overrides
            .index_dir
            .or_else(|| lookup(ENV_INDEX_DIR).map(PathBuf::from))
            .map_or_else(|| IndexPaths::for_notes_root(&notes_root), IndexPaths::new);

        let glob = overrides
            .glob
            .or_else(|| lookup(ENV_FILE_GLOB))
            .unwrap_or_else(|| DEFAULT_FILE_GLOB.to_string());
        let only_published = overrides.only_published
            || lookup(ENV_ONLY_PUBLISHED)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);

        let embed_mode = match overrides.embed_mode {
            Some(mode) => mode,
            None => match lookup(ENV_EMBEDDING_MODE) {
                Some(raw) => EmbedMode::parse(&raw).with_context(|| {
                    format!("{ENV_EMBEDDING_MODE} must be 'http' or 'stub', got '{raw}'")
                })?,
                None => EmbedMode::default(),
            },
        };

        Ok(Self {
            notes_root,
            index,
            scan: ScanOptions {
                glob,
                only_published,
            },
            embed_mode,
        })
    }
}
