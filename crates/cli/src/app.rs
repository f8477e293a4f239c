use anyhow::{Context, Result};
use notes_indexer::NoteIndexer;
use notes_providers::{HttpChatGateway, HttpEmbeddingGateway, ProviderSettings};
use notes_rag::CompletionGateway;
use notes_retrieval::RetrievalSelector;
use notes_vector_store::{
    EmbeddingGateway, IndexSnapshot, NoteVectorStore, StoreConfig, StubEmbedder,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::flags::EmbedMode;

pub(crate) fn embedding_gateway(mode: EmbedMode) -> Result<Arc<dyn EmbeddingGateway>> {
    match mode {
        EmbedMode::Stub => Ok(Arc::new(StubEmbedder::default())),
        EmbedMode::Http => {
            let settings = ProviderSettings::embedding_from_env()
                .context("Embedding provider is not configured")?;
            log::debug!("Embedding via {settings:?}");
            Ok(Arc::new(HttpEmbeddingGateway::new(&settings)?))
        }
    }
}

/// Resolve the chat model up front so a missing key fails before any work
pub(crate) fn chat_gateway(provider: Option<&str>) -> Result<Arc<dyn CompletionGateway>> {
    let settings =
        ProviderSettings::chat_from_env(provider).context("Chat provider is not configured")?;
    log::debug!("Chat via {settings:?}");
    Ok(Arc::new(HttpChatGateway::new(&settings)?))
}

pub(crate) async fn open_store(config: &AppConfig) -> Result<Arc<NoteVectorStore>> {
    let embedder = embedding_gateway(config.embed_mode)?;
    let store = NoteVectorStore::open(config.index.clone(), embedder, StoreConfig::default())
        .await
        .with_context(|| format!("Failed to open index at {}", config.index.dir().display()))?;
    Ok(Arc::new(store))
}

pub(crate) async fn open_indexer(config: &AppConfig) -> Result<NoteIndexer> {
    let store = open_store(config).await?;
    Ok(NoteIndexer::new(
        &config.notes_root,
        config.scan.clone(),
        store,
    )?)
}

pub(crate) async fn open_selector(config: &AppConfig) -> Result<Arc<RetrievalSelector>> {
    let store = open_store(config).await?;
    Ok(Arc::new(RetrievalSelector::new(store)))
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub notes_root: String,
    pub index_dir: String,
    pub embed_mode: &'static str,
    pub glob: String,
    pub only_published: bool,
    pub built: bool,
    pub entries: usize,
    pub sources: usize,
    pub dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// Inspect the persisted index without configuring any gateway
pub(crate) async fn status(config: &AppConfig) -> StatusReport {
    let paths = &config.index;
    let built = paths.vectors().exists() || paths.metadata().exists();
    let (snapshot, problem) = if built {
        match IndexSnapshot::load(paths).await {
            Ok(snapshot) => (snapshot, None),
            Err(err) => (IndexSnapshot::empty(), Some(err.to_string())),
        }
    } else {
        (IndexSnapshot::empty(), None)
    };

    StatusReport {
        notes_root: config.notes_root.display().to_string(),
        index_dir: paths.dir().display().to_string(),
        embed_mode: config.embed_mode.as_str(),
        glob: config.scan.glob.clone(),
        only_published: config.scan.only_published,
        built,
        entries: snapshot.len(),
        sources: snapshot.source_ids().len(),
        dimension: snapshot.dimension(),
        problem,
    }
}
