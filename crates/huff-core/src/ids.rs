//! Identifiers for source files and per-byte source locations.

use std::fmt;

/// Index of a file inside an [`InputMap`](crate::InputMap).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// The (file, line) a single output byte originates from.
///
/// The compiler stores one of these per emitted byte, so it is kept `Copy`
/// and small; file names are resolved through the input map on demand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// File the byte came from.
    pub file: FileId,
    /// Line number (1-indexed).
    pub line: u32,
}

impl SourceLocation {
    #[inline]
    pub fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.line)
    }
}
