//! Source loading, comment stripping and include flattening.
//!
//! The parser never sees files. [`flatten`] turns an entry file and its
//! `#include` graph into one normalized string plus an [`InputMap`] that
//! maps every byte back to a file and line:
//!
//! - comments are replaced by spaces (newlines kept), so offsets and line
//!   numbers inside each file stay valid
//! - `#include "path"` directives may only appear before any other text in a
//!   file; each is blanked and the included file's flattened text is placed
//!   before the including file
//! - a file is included at most once, the first time it is reached

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use huff_core::{InputMap, SourceError};

use crate::lexer::Cursor;

/// Something that can produce the text of a source file by name.
pub trait SourceLoader {
    /// Load `path`. `from` names the including file, if any.
    fn load(&self, path: &str, from: Option<&str>) -> Result<String, SourceError>;
}

/// Loads files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, path: &str, from: Option<&str>) -> Result<String, SourceError> {
        let full = self.root.join(path);
        match fs::read_to_string(&full) {
            Ok(text) => Ok(text),
            Err(source) => match from {
                Some(from) if source.kind() == std::io::ErrorKind::NotFound => {
                    Err(SourceError::IncludeNotFound {
                        path: path.to_string(),
                        from: from.to_string(),
                    })
                }
                _ => Err(SourceError::Io { path: full, source }),
            },
        }
    }
}

/// In-memory file set, used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &str, from: Option<&str>) -> Result<String, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::IncludeNotFound {
                path: path.to_string(),
                from: from.unwrap_or("<entry>").to_string(),
            })
    }
}

/// Replace `//` and `/* */` comments with spaces, keeping newlines.
///
/// The result has exactly the same byte length and line structure as
/// `text`.
pub fn strip_comments(text: &str, file: &str) -> Result<String, SourceError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut line = 1u32;

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                blank(&mut out, ch);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    blank(&mut out, next);
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let opened_at = line;
                blank(&mut out, ch);
                blank(&mut out, '*');
                chars.next();
                let mut closed = false;
                while let Some(next) = chars.next() {
                    if next == '*' && chars.peek() == Some(&'/') {
                        blank(&mut out, next);
                        blank(&mut out, '/');
                        chars.next();
                        closed = true;
                        break;
                    }
                    if next == '\n' {
                        line += 1;
                        out.push('\n');
                    } else {
                        blank(&mut out, next);
                    }
                }
                if !closed {
                    return Err(SourceError::UnterminatedComment {
                        file: file.to_string(),
                        line: opened_at,
                    });
                }
            }
            '\n' => {
                line += 1;
                out.push('\n');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Push as many spaces as `ch` occupies in UTF-8.
#[inline]
fn blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

/// Flatten `entry` and everything it includes into one [`InputMap`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn flatten(entry: &str, loader: &impl SourceLoader) -> Result<InputMap, SourceError> {
    let mut flattener = Flattener {
        loader,
        seen: FxHashSet::default(),
        files: Vec::new(),
    };
    flattener.seen.insert(entry.to_string());
    flattener.visit(entry, None)?;

    let mut map = InputMap::new();
    for (name, text) in &flattener.files {
        map.push_file(name.clone(), text);
    }
    debug!(entry, files = map.file_count(), bytes = map.text().len(), "flattened sources");
    Ok(map)
}

struct Flattener<'l, L> {
    loader: &'l L,
    seen: FxHashSet<String>,
    /// Normalized files in output order.
    files: Vec<(String, String)>,
}

impl<L: SourceLoader> Flattener<'_, L> {
    fn visit(&mut self, path: &str, from: Option<&str>) -> Result<(), SourceError> {
        let raw = self.loader.load(path, from)?;
        let mut text = strip_comments(&raw, path)?;

        for (include, range) in leading_includes(&text) {
            trace!(file = path, include = %include, "include directive");
            if self.seen.insert(include.clone()) {
                self.visit(&include, Some(path))?;
            }
            text.replace_range(range.clone(), &" ".repeat(range.len()));
        }

        self.files.push((path.to_string(), text));
        Ok(())
    }
}

/// The `#include "..."` directives at the head of `text`, with their byte
/// ranges.
fn leading_includes(text: &str) -> Vec<(String, std::ops::Range<usize>)> {
    let mut includes = Vec::new();
    let mut cursor = Cursor::new(text);
    loop {
        cursor.skip_whitespace();
        let start = cursor.offset();
        if !cursor.eat_str("#include") {
            break;
        }
        cursor.eat_while(|c| c == ' ' || c == '\t');
        if !cursor.eat('"') {
            break;
        }
        let path = cursor.eat_while(|c| c != '"' && c != '\n');
        if !cursor.eat('"') {
            break;
        }
        includes.push((path.to_string(), start..cursor.offset()));
    }
    includes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn strips_line_and_block_comments() {
        let text = "add // trailing\n/* a\nb */ sub";
        let stripped = strip_comments(text, "t.huff").unwrap();
        assert_eq!(stripped.len(), text.len());
        assert_eq!(
            stripped,
            format!("add{}\n{}\n{}sub", " ".repeat(12), " ".repeat(4), " ".repeat(5))
        );
    }

    #[test]
    fn strip_keeps_multibyte_offsets() {
        let text = "// héllo\nadd";
        let stripped = strip_comments(text, "t.huff").unwrap();
        assert_eq!(stripped.len(), text.len());
        assert!(stripped.ends_with("\nadd"));
    }

    #[test]
    fn unterminated_block_comment() {
        let err = strip_comments("add\n/* never closed", "t.huff").unwrap_err();
        assert!(matches!(
            err,
            SourceError::UnterminatedComment { ref file, line: 2 } if file == "t.huff"
        ));
    }

    #[test]
    fn includes_come_first_and_are_blanked() {
        let loader = MemoryLoader::new()
            .with_file("main.huff", "#include \"lib.huff\"\nMAIN_TEXT")
            .with_file("lib.huff", "LIB_TEXT");
        let map = flatten("main.huff", &loader).unwrap();

        assert_eq!(map.file_count(), 2);
        let text = map.text();
        let lib = text.find("LIB_TEXT").unwrap();
        let main = text.find("MAIN_TEXT").unwrap();
        assert!(lib < main);
        assert!(!text.contains("#include"));
        assert_eq!(map.locate(main).line, 2);
        assert_eq!(map.location(lib).file, "lib.huff");
    }

    #[test]
    fn includes_are_deduplicated() {
        let loader = MemoryLoader::new()
            .with_file("main.huff", "#include \"a.huff\"\n#include \"b.huff\"\nM")
            .with_file("a.huff", "#include \"shared.huff\"\nA")
            .with_file("b.huff", "#include \"shared.huff\"\nB")
            .with_file("shared.huff", "S");
        let map = flatten("main.huff", &loader).unwrap();

        assert_eq!(map.file_count(), 4);
        assert_eq!(map.text().matches('S').count(), 1);
    }

    #[test]
    fn include_cycle_terminates() {
        let loader = MemoryLoader::new()
            .with_file("a.huff", "#include \"b.huff\"\nA")
            .with_file("b.huff", "#include \"a.huff\"\nB");
        let map = flatten("a.huff", &loader).unwrap();
        assert_eq!(map.file_count(), 2);
    }

    #[test]
    fn include_after_code_is_left_alone() {
        let loader = MemoryLoader::new().with_file("main.huff", "add\n#include \"x.huff\"");
        let map = flatten("main.huff", &loader).unwrap();
        assert_eq!(map.file_count(), 1);
        assert!(map.text().contains("#include"));
    }

    #[test]
    fn missing_include() {
        let loader = MemoryLoader::new().with_file("main.huff", "#include \"gone.huff\"");
        let err = flatten("main.huff", &loader).unwrap_err();
        assert!(matches!(
            err,
            SourceError::IncludeNotFound { ref path, ref from } if path == "gone.huff" && from == "main.huff"
        ));
    }

    #[test]
    fn fs_loader_reads_relative_to_root() {
        let dir = TempDir::new("huff_includes").unwrap();
        let mut lib = fs::File::create(dir.path().join("lib.huff")).unwrap();
        writeln!(lib, "#define macro LIB = takes(0) returns(0) {{ add }}").unwrap();
        fs::write(dir.path().join("main.huff"), "#include \"lib.huff\"\n").unwrap();

        let loader = FsLoader::new(dir.path());
        let map = flatten("main.huff", &loader).unwrap();
        assert!(map.text().contains("#define macro LIB"));

        let err = loader.load("absent.huff", None).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
