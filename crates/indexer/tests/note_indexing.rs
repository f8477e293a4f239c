use notes_indexer::{IndexerError, NoteIndexer, ScanOptions};
use notes_vector_store::{IndexPaths, NoteVectorStore, StoreConfig, StubEmbedder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, content).expect("write note");
}

async fn open_indexer(root: &Path, options: ScanOptions) -> NoteIndexer {
    let store = NoteVectorStore::open(
        IndexPaths::for_notes_root(root),
        Arc::new(StubEmbedder::default()),
        StoreConfig::default(),
    )
    .await
    .expect("open store");
    NoteIndexer::new(root, options, Arc::new(store)).expect("indexer")
}

fn indexed_sources(indexer: &NoteIndexer) -> Vec<String> {
    let mut ids: Vec<String> = indexer
        .store()
        .snapshot()
        .source_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn full_index_persists_and_reloads() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "a.md", "# Alpha\nFirst note.");
    write(temp.path(), "sub/b.md", "---\ntitle: Bee\n---\nSecond note.");

    let indexer = open_indexer(temp.path(), ScanOptions::default()).await;
    let stats = indexer.index_full().await.expect("index");
    assert_eq!(stats.files, 2);
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.total_entries, 2);
    assert!(stats.errors.is_empty());

    let paths = IndexPaths::for_notes_root(temp.path());
    assert!(paths.vectors().exists());
    assert!(paths.metadata().exists());

    // index artifacts under the root are never scanned as notes
    let reopened = open_indexer(temp.path(), ScanOptions::default()).await;
    assert_eq!(indexed_sources(&reopened), vec!["a.md", "sub/b.md"]);
    let hits = reopened
        .store()
        .search("Second note.", 1)
        .await
        .expect("search");
    assert_eq!(hits[0].title, "Bee");
}

#[tokio::test]
async fn incremental_index_tracks_changes() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "keep.md", "Unchanged note.");
    write(temp.path(), "edit.md", "Old text.");
    write(temp.path(), "drop.md", "Soon deleted.");

    let indexer = open_indexer(temp.path(), ScanOptions::default()).await;
    indexer.index().await.expect("initial index");
    assert_eq!(indexer.store().len(), 3);

    write(temp.path(), "edit.md", "New text.");
    write(temp.path(), "new.md", "Fresh note.");
    std::fs::remove_file(temp.path().join("drop.md")).expect("rm");

    let stats = indexer.index().await.expect("incremental index");
    assert_eq!(stats.files, 2, "only edited and new notes are re-embedded");
    assert_eq!(stats.removed, 1);
    assert_eq!(indexed_sources(&indexer), vec!["edit.md", "keep.md", "new.md"]);

    let texts: Vec<String> = indexer
        .store()
        .snapshot()
        .entries()
        .iter()
        .map(|e| e.text().to_string())
        .collect();
    assert!(texts.contains(&"New text.".to_string()));
    assert!(!texts.contains(&"Old text.".to_string()));

    let stats = indexer.index().await.expect("no-op index");
    assert_eq!(stats.files, 0);
    assert_eq!(stats.removed, 0);
}

#[tokio::test]
async fn index_paths_upserts_and_removes() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "a.md", "---\nstatus: publish\n---\nAlpha.");
    write(temp.path(), "b.md", "---\nstatus: publish\n---\nBravo.");

    let options = ScanOptions {
        only_published: true,
        ..ScanOptions::default()
    };
    let indexer = open_indexer(temp.path(), options).await;
    indexer.index_full().await.expect("index");
    assert_eq!(indexed_sources(&indexer), vec!["a.md", "b.md"]);

    write(temp.path(), "a.md", "---\nstatus: draft\n---\nAlpha, unpublished.");
    write(temp.path(), "c.md", "---\nstatus: published\n---\nCharlie.");
    std::fs::remove_file(temp.path().join("b.md")).expect("rm");

    let stats = indexer
        .index_paths(&[
            PathBuf::from("a.md"),
            temp.path().join("b.md"),
            PathBuf::from("c.md"),
            PathBuf::from("../outside.md"),
        ])
        .await
        .expect("index paths");

    assert_eq!(stats.files, 1);
    assert_eq!(stats.removed, 2);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(indexed_sources(&indexer), vec!["c.md"]);
}

#[tokio::test]
async fn indexers_sharing_a_directory_keep_each_others_notes() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "a.md", "# Alpha\nWritten by the first indexer.");
    write(temp.path(), "b.md", "# Bravo\nWritten by the second indexer.");

    // both open before either has written anything
    let first = open_indexer(temp.path(), ScanOptions::default()).await;
    let second = open_indexer(temp.path(), ScanOptions::default()).await;

    first
        .index_paths(&[PathBuf::from("a.md")])
        .await
        .expect("first index");
    let stats = second
        .index_paths(&[PathBuf::from("b.md")])
        .await
        .expect("second index");
    assert_eq!(stats.total_entries, 2);

    let reopened = open_indexer(temp.path(), ScanOptions::default()).await;
    assert_eq!(indexed_sources(&reopened), vec!["a.md", "b.md"]);

    // an incremental run on the stale first indexer finds nothing to redo
    let stats = first.index().await.expect("incremental");
    assert_eq!(stats.files, 0);
    assert_eq!(stats.removed, 0);
    assert_eq!(indexed_sources(&first), vec!["a.md", "b.md"]);
}

#[tokio::test]
async fn invalid_glob_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let store = NoteVectorStore::open(
        IndexPaths::for_notes_root(temp.path()),
        Arc::new(StubEmbedder::default()),
        StoreConfig::default(),
    )
    .await
    .expect("open store");
    let options = ScanOptions {
        glob: "**/[".to_string(),
        ..ScanOptions::default()
    };
    assert!(matches!(
        NoteIndexer::new(temp.path(), options, Arc::new(store)),
        Err(IndexerError::InvalidGlob { .. })
    ));
}
