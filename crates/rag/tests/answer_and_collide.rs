use async_trait::async_trait;
use notes_chunker::ChunkerConfig;
use notes_rag::prompt::{DEFAULT_PERSONA, GROUNDING_INSTRUCTION};
use notes_rag::{
    ChatMessage, CompletionGateway, ConceptCollider, Idea, RagError, RagPipeline, Role,
};
use notes_retrieval::{PairMode, RetrievalSelector};
use notes_vector_store::{
    EmbeddingGateway, IndexPaths, NoteVectorStore, SourceDocument, StoreConfig, StubEmbedder,
    VectorStoreError,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Returns a canned reply and remembers every conversation it saw
struct ScriptedLlm {
    reply: String,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> notes_rag::Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// Embeds while building, then fails every query
struct QueryFailingEmbedder {
    inner: StubEmbedder,
    armed: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl EmbeddingGateway for QueryFailingEmbedder {
    async fn embed(&self, texts: &[String]) -> notes_vector_store::Result<Vec<Vec<f32>>> {
        if self.armed.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(VectorStoreError::embedding("gateway down"));
        }
        self.inner.embed(texts).await
    }
}

fn notes() -> Vec<SourceDocument> {
    vec![
        SourceDocument::new(
            "brew/tea.md",
            "---\ntitle: Tea Notes\ntags: [drinks]\n---\nGreen tea brews best at 80C for two minutes.",
        ),
        SourceDocument::new("brew/coffee.md", "Espresso needs finely ground beans."),
        SourceDocument::new("garden/soil.md", "Compost improves clay soil drainage."),
    ]
}

async fn selector(tmp: &TempDir, embedder: Arc<dyn EmbeddingGateway>) -> Arc<RetrievalSelector> {
    let store = NoteVectorStore::open(IndexPaths::new(tmp.path()), embedder, StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(store.rebuild(&notes()).await, 3);
    Arc::new(RetrievalSelector::new(Arc::new(store)))
}

#[tokio::test]
async fn answer_cites_every_context() {
    let tmp = TempDir::new().unwrap();
    let llm = ScriptedLlm::new("Brew at 80C [1].");
    let pipeline = RagPipeline::new(
        selector(&tmp, Arc::new(StubEmbedder::default())).await,
        llm.clone(),
    );

    let answer = pipeline
        .answer("Green tea brews best at 80C for two minutes.", 2)
        .await
        .unwrap();

    assert_eq!(answer.answer, "Brew at 80C [1].");
    assert_eq!(answer.contexts.len(), 2);
    assert_eq!(answer.citations.len(), 2);

    let top = &answer.citations[0];
    assert_eq!(top.title, "Tea Notes");
    assert_eq!(top.source_id, "brew/tea.md");
    assert_eq!(top.tags, vec!["drinks".to_string()]);
    assert_eq!(top.snippet, "Green tea brews best at 80C for two minutes.");
    assert!((top.score - 1.0).abs() < 1e-4);

    let messages = llm.last();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.starts_with(DEFAULT_PERSONA));
    assert!(messages[0].content.contains(GROUNDING_INSTRUCTION));
    assert!(messages[0]
        .content
        .contains("[1] Tea Notes (brew/tea.md)\nGreen tea brews best at 80C for two minutes."));
    assert!(messages[0].content.contains("\n\n[2] "));
    assert_eq!(messages[1], ChatMessage::user("Green tea brews best at 80C for two minutes."));
}

#[tokio::test]
async fn persona_replaces_default() {
    let tmp = TempDir::new().unwrap();
    let llm = ScriptedLlm::new("ok");
    let pipeline = RagPipeline::new(
        selector(&tmp, Arc::new(StubEmbedder::default())).await,
        llm.clone(),
    )
    .with_persona("You are a gardener.");

    pipeline.answer("soil?", 1).await.unwrap();
    let system = &llm.last()[0].content;
    assert!(system.starts_with("You are a gardener.\n"));
    assert!(!system.contains(DEFAULT_PERSONA));
}

#[tokio::test]
async fn empty_question_is_rejected_before_calling_model() {
    let tmp = TempDir::new().unwrap();
    let llm = ScriptedLlm::new("unused");
    let pipeline = RagPipeline::new(
        selector(&tmp, Arc::new(StubEmbedder::default())).await,
        llm.clone(),
    );

    assert!(matches!(
        pipeline.answer("   ", 5).await,
        Err(RagError::EmptyQuestion)
    ));
    assert!(llm.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn retrieval_failure_answers_without_context() {
    let tmp = TempDir::new().unwrap();
    let embedder = Arc::new(QueryFailingEmbedder {
        inner: StubEmbedder::default(),
        armed: std::sync::atomic::AtomicBool::new(false),
    });
    let retrieval = selector(&tmp, embedder.clone()).await;
    embedder
        .armed
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let llm = ScriptedLlm::new("I don't know.");
    let answer = RagPipeline::new(retrieval, llm.clone())
        .answer("anything?", 3)
        .await
        .unwrap();

    assert_eq!(answer.answer, "I don't know.");
    assert!(answer.contexts.is_empty());
    assert!(answer.citations.is_empty());
    assert_eq!(llm.last()[0].content, DEFAULT_PERSONA);
}

#[tokio::test]
async fn collision_reports_both_notes_and_parsed_idea() {
    let tmp = TempDir::new().unwrap();
    let llm = ScriptedLlm::new(
        "```json\n{\"connection\":\"heat\",\"title\":\"Thermal Gardens\",\"outline\":[\"a\",\"b\",\"c\"]}\n```",
    );
    let collider = ConceptCollider::new(
        selector(&tmp, Arc::new(StubEmbedder::default())).await,
        llm.clone(),
    )
    .with_hint("think about temperature");

    let mut rng = StdRng::seed_from_u64(11);
    let result = collider
        .collide(PairMode::MaxDissimilarity, &mut rng)
        .await
        .unwrap();

    assert_eq!(result.mode, PairMode::MaxDissimilarity);
    assert_ne!(result.source_notes[0].source_id, result.source_notes[1].source_id);
    match &result.idea {
        Idea::Parsed(draft) => {
            assert_eq!(draft.title, "Thermal Gardens");
            assert_eq!(draft.outline.len(), 3);
        }
        Idea::Raw { raw } => panic!("expected parsed idea, got {raw}"),
    }

    let messages = llm.last();
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[1].content.contains("think about temperature"));
    assert!(messages[1].content.starts_with("[Note A]: "));
}

#[tokio::test]
async fn collision_truncates_long_notes() {
    let tmp = TempDir::new().unwrap();
    let config = StoreConfig {
        chunker: ChunkerConfig {
            chunk_size: 2000,
            ..ChunkerConfig::default()
        },
        ..StoreConfig::default()
    };
    let store = NoteVectorStore::open(
        IndexPaths::new(tmp.path()),
        Arc::new(StubEmbedder::default()),
        config,
    )
    .await
    .unwrap();
    let long = "word ".repeat(300);
    store
        .rebuild(&[
            SourceDocument::new("a.md", long.trim()),
            SourceDocument::new("b.md", long.trim()),
        ])
        .await;

    let llm = ScriptedLlm::new("plain text idea");
    let collider = ConceptCollider::new(
        Arc::new(RetrievalSelector::new(Arc::new(store))),
        llm.clone(),
    );
    let mut rng = StdRng::seed_from_u64(5);
    let result = collider.collide(PairMode::Random, &mut rng).await.unwrap();

    assert_eq!(
        result.idea,
        Idea::Raw {
            raw: "plain text idea".to_string()
        }
    );
    let user = &llm.last()[1].content;
    let expected_note = format!("{}...", &long.trim()[..800]);
    assert!(user.contains(&format!("[Note A]: {expected_note}\n---\n")));
}

#[tokio::test]
async fn collision_needs_two_chunks() {
    let tmp = TempDir::new().unwrap();
    let store = NoteVectorStore::open(
        IndexPaths::new(tmp.path()),
        Arc::new(StubEmbedder::default()),
        StoreConfig::default(),
    )
    .await
    .unwrap();
    let collider = ConceptCollider::new(
        Arc::new(RetrievalSelector::new(Arc::new(store))),
        ScriptedLlm::new("unused"),
    );
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        collider.collide(PairMode::Random, &mut rng).await,
        Err(RagError::Retrieval(_))
    ));
}
