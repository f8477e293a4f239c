use crate::error::{IndexerError, Result};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use notes_chunker::{parse_frontmatter, SourceDocument};
use notes_vector_store::INDEX_DIR_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_FILE_GLOB: &str = "**/*.md";

/// Which notes under the root are indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Glob over paths relative to the notes root
    pub glob: String,
    /// Keep only notes whose frontmatter `status` is `publish`/`published`
    pub only_published: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            glob: DEFAULT_FILE_GLOB.to_string(),
            only_published: false,
        }
    }
}

/// Outcome of reading one candidate note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteStatus {
    Indexable(SourceDocument),
    /// Present but excluded (glob mismatch or unpublished)
    Excluded,
    Missing,
}

/// Finds markdown notes under a root directory (.gitignore aware)
pub struct NoteScanner {
    root: PathBuf,
    options: ScanOptions,
    matcher: GlobMatcher,
}

impl NoteScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
        let matcher = Glob::new(&options.glob)
            .map_err(|err| IndexerError::InvalidGlob {
                pattern: options.glob.clone(),
                reason: err.to_string(),
            })?
            .compile_matcher();
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            options,
            matcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Paths of every file under the root matching the glob
    pub fn scan_paths(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(move |entry| !Self::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    if self.matches(entry.path()) {
                        files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!(
            "Found {} notes matching '{}' under {}",
            files.len(),
            self.options.glob,
            self.root.display()
        );
        files
    }

    /// Read every indexable note. Unreadable files are returned as errors
    /// alongside the documents rather than aborting the scan.
    pub fn scan(&self) -> (Vec<SourceDocument>, Vec<String>) {
        let mut documents = Vec::new();
        let mut errors = Vec::new();
        for path in self.scan_paths() {
            match self.load(&path) {
                Ok(NoteStatus::Indexable(doc)) => documents.push(doc),
                Ok(NoteStatus::Excluded | NoteStatus::Missing) => {}
                Err(err) => {
                    log::warn!("Skipping {}: {err}", path.display());
                    errors.push(format!("{}: {err}", path.display()));
                }
            }
        }
        if self.options.only_published {
            log::info!("{} published notes", documents.len());
        }
        (documents, errors)
    }

    /// Read a single note, applying the glob and publish filters
    pub fn load(&self, path: &Path) -> Result<NoteStatus> {
        let absolute = self.absolute(path);
        let source_id = self.source_id(&absolute)?;
        if !absolute.is_file() {
            return Ok(NoteStatus::Missing);
        }
        if !self.matcher.is_match(&source_id) {
            return Ok(NoteStatus::Excluded);
        }

        let content = std::fs::read_to_string(&absolute)?;
        if self.options.only_published && !parse_frontmatter(&content).0.is_published() {
            log::debug!("Skipping unpublished note {source_id}");
            return Ok(NoteStatus::Excluded);
        }
        Ok(NoteStatus::Indexable(SourceDocument::new(source_id, content)))
    }

    /// Root-relative, `/`-separated identifier of `path`.
    ///
    /// Paths escaping the root are rejected.
    pub fn source_id(&self, path: &Path) -> Result<String> {
        let absolute = self.absolute(path);
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| {
                IndexerError::InvalidPath(format!("{} is outside the notes root", path.display()))
            })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(IndexerError::InvalidPath(format!(
                        "{} is outside the notes root",
                        path.display()
                    )))
                }
            }
        }
        if parts.is_empty() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a file under the notes root",
                path.display()
            )));
        }
        Ok(parts.join("/"))
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn matches(&self, path: &Path) -> bool {
        self.source_id(path)
            .map(|id| self.matcher.is_match(id))
            .unwrap_or(false)
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

const IGNORED_SCOPES: &[&str] = &[
    INDEX_DIR_NAME,
    // VCS / editors
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".obsidian",
    ".trash",
    // tooling
    "node_modules",
    "target",
    ".venv",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn scans_markdown_with_relative_ids() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "top.md", "# Top");
        write(tmp.path(), "deep/nested/note.md", "# Nested");
        write(tmp.path(), "deep/image.png", "png");
        write(tmp.path(), ".obsidian/workspace.md", "# hidden");
        write(tmp.path(), "node_modules/pkg/readme.md", "# vendored");

        let scanner = NoteScanner::new(tmp.path(), ScanOptions::default()).unwrap();
        let (docs, errors) = scanner.scan();
        let ids: Vec<&str> = docs.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["deep/nested/note.md", "top.md"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn published_filter_accepts_both_spellings() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "---\nstatus: publish\n---\nA");
        write(tmp.path(), "b.md", "---\nstatus: Published\n---\nB");
        write(tmp.path(), "c.md", "---\nstatus: draft\n---\nC");
        write(tmp.path(), "d.md", "no frontmatter");

        let options = ScanOptions {
            only_published: true,
            ..ScanOptions::default()
        };
        let scanner = NoteScanner::new(tmp.path(), options).unwrap();
        let (docs, _) = scanner.scan();
        let ids: Vec<&str> = docs.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.md"]);
        assert_eq!(scanner.load(Path::new("c.md")).unwrap(), NoteStatus::Excluded);
    }

    #[test]
    fn custom_glob_narrows_scan() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journal/2024.md", "j");
        write(tmp.path(), "ideas/x.md", "i");
        let options = ScanOptions {
            glob: "journal/*.md".to_string(),
            ..ScanOptions::default()
        };
        let scanner = NoteScanner::new(tmp.path(), options).unwrap();
        let (docs, _) = scanner.scan();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source_id, "journal/2024.md");
        assert_eq!(
            scanner.load(Path::new("ideas/x.md")).unwrap(),
            NoteStatus::Excluded
        );
    }

    #[test]
    fn rejects_paths_outside_root_and_bad_globs() {
        let tmp = TempDir::new().unwrap();
        let scanner = NoteScanner::new(tmp.path(), ScanOptions::default()).unwrap();
        assert!(scanner.source_id(Path::new("../escape.md")).is_err());
        assert!(scanner.source_id(Path::new("/somewhere/else.md")).is_err());
        assert_eq!(
            scanner.load(Path::new("gone.md")).unwrap(),
            NoteStatus::Missing
        );

        let bad = ScanOptions {
            glob: "[".to_string(),
            ..ScanOptions::default()
        };
        assert!(matches!(
            NoteScanner::new(tmp.path(), bad),
            Err(IndexerError::InvalidGlob { .. })
        ));
    }
}
