//! Mtask file storage
//!
//! Reads take a shared lock; writes render first, then fill `<path>.tmp`
//! under an exclusive lock and rename it over the target, so a failed save
//! leaves the previous file intact.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use crate::document::read_mtask;
use crate::domain::AstTree;
use crate::format::render_mtask;

/// Store for one Mtask document
#[derive(Debug, Clone)]
pub struct MtaskStore {
    path: PathBuf,
}

impl MtaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the raw document; `None` if the file does not exist
    pub fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {}", self.path.display()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        Ok(Some(bytes))
    }

    /// Reads the document as a tree; a missing file is an empty tree
    pub fn read_tree(&self) -> Result<AstTree> {
        match self.read_bytes()? {
            Some(bytes) => read_mtask(&bytes)
                .with_context(|| format!("Failed to parse {}", self.path.display())),
            None => Ok(AstTree::default()),
        }
    }

    /// Renders and writes a tree
    pub fn write_tree(&self, tree: &AstTree) -> Result<()> {
        let text = render_mtask(tree).context("Failed to render Mtask document")?;
        self.write_text(&text)
    }

    /// Atomically replaces the file contents
    pub fn write_text(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(text.as_bytes())
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), bytes = text.len(), "wrote mtask file");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
