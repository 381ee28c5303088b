//! Normalized source text and the byte index -> (file, line) table.
//!
//! Include flattening concatenates every file of a program into one string.
//! [`InputMap`] owns that string and remembers where each file starts so that
//! any byte index into it can be traced back to the file and line it came from.

use crate::{FileId, Location, SourceLocation};

/// One file's segment of the normalized text.
#[derive(Debug, Clone)]
struct FileEntry {
    name: String,
    /// Byte index of the segment start in the normalized text.
    start: usize,
    /// Byte index one past the segment end.
    end: usize,
    /// Absolute byte indices at which each line of the segment starts.
    line_starts: Vec<usize>,
}

/// Normalized program text plus its file table.
#[derive(Debug, Clone, Default)]
pub struct InputMap {
    text: String,
    files: Vec<FileEntry>,
}

impl InputMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding a single file.
    pub fn single(name: impl Into<String>, text: &str) -> Self {
        let mut map = Self::new();
        map.push_file(name, text);
        map
    }

    /// Append a file's (already normalized) text and return its id.
    pub fn push_file(&mut self, name: impl Into<String>, text: &str) -> FileId {
        let start = self.text.len();
        let mut line_starts = vec![start];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(i, _)| start + i + 1)
                .filter(|&i| i < start + text.len()),
        );
        self.text.push_str(text);

        let id = FileId(self.files.len() as u32);
        self.files.push(FileEntry {
            name: name.into(),
            start,
            end: self.text.len(),
            line_starts,
        });
        id
    }

    /// The normalized text of every file, concatenated in flattening order.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of files in the map.
    #[inline]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Name of a file, or `"<unknown>"` for an id this map never issued.
    pub fn file_name(&self, file: FileId) -> &str {
        self.files
            .get(file.index())
            .map(|f| f.name.as_str())
            .unwrap_or("<unknown>")
    }

    fn entry_for(&self, index: usize) -> Option<(usize, &FileEntry)> {
        if self.files.is_empty() {
            return None;
        }
        // Last file whose segment starts at or before `index`.
        let pos = self.files.partition_point(|f| f.start <= index);
        let slot = pos.saturating_sub(1);
        Some((slot, &self.files[slot]))
    }

    /// Resolve a byte index into the normalized text to its (file, line).
    pub fn locate(&self, index: usize) -> SourceLocation {
        match self.entry_for(index) {
            Some((slot, entry)) => {
                let line = entry.line_starts.partition_point(|&s| s <= index).max(1);
                SourceLocation::new(FileId(slot as u32), line as u32)
            }
            None => SourceLocation::default(),
        }
    }

    /// Resolve a byte index to a printable location including the line text.
    pub fn location(&self, index: usize) -> Location {
        let Some((_, entry)) = self.entry_for(index) else {
            return Location::new("<unknown>", 0, "");
        };
        let line_idx = entry
            .line_starts
            .partition_point(|&s| s <= index)
            .saturating_sub(1);
        let line_start = entry.line_starts[line_idx];
        let line_end = self.text[line_start..entry.end]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(entry.end);
        Location::new(
            entry.name.clone(),
            line_idx as u32 + 1,
            self.text[line_start..line_end].trim_end(),
        )
    }
}
