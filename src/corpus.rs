//! Ordered text corpus of one repository's selected source files

use serde::Serialize;
use sha2::{Digest, Sha256};

/// The concatenation of every selected file's content, each followed by a
/// single `\n`, in the order files were visited
///
/// Immutable once built: the crawler owns a [`CorpusBuilder`] while
/// traversing and freezes it with [`CorpusBuilder::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeCorpus {
    text: String,
    #[serde(skip)]
    char_len: usize,
    file_count: usize,
}

impl CodeCorpus {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters (the unit chunk bounds are expressed in)
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of files that contributed to the corpus
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// SHA-256 of the corpus text, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<&str> for CodeCorpus {
    /// Wrap text that is already a corpus (e.g. one loaded from storage)
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            char_len: text.chars().count(),
            file_count: 0,
        }
    }
}

/// Accumulates file contents in visit order
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    text: String,
    char_len: usize,
    file_count: usize,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one file's content followed by a line break
    ///
    /// An empty file is not skipped: it still adds its `\n`, so every
    /// selected file leaves a trace in the corpus.
    pub fn push_file(&mut self, content: &str) {
        self.text.reserve(content.len() + 1);
        self.text.push_str(content);
        self.text.push('\n');
        self.char_len += content.chars().count() + 1;
        self.file_count += 1;
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn finish(self) -> CodeCorpus {
        CodeCorpus {
            text: self.text,
            char_len: self.char_len,
            file_count: self.file_count,
        }
    }
}
