//! The operation model.
//!
//! A [`Macro`] is an ordered list of [`Operation`]s produced once by the parser
//! and never mutated afterwards. Every operation remembers the byte index of
//! its token in the normalized source so each emitted byte can be traced back
//! to a file and line.

use num_bigint::BigUint;

use crate::LiteralError;
use crate::literal::{bytes_to_value, encode_push};

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// A single resolved opcode byte.
    Opcode(u8),
    /// A push opcode and its immediate bytes.
    Push { opcode: u8, immediate: Vec<u8> },
    /// A named jump destination.
    JumpDest(String),
    /// A push of a jump label's offset, resolved once the label is known.
    PushJumpLabel(String),
    /// An inlined call to another macro with raw template arguments.
    MacroCall { name: String, args: Vec<String> },
    /// A template parameter, resolved per call site.
    TemplateRef(String),
    /// A push of another macro's compiled byte length.
    CodeSize { name: String, args: Vec<String> },
    /// A push of a jump table's start offset.
    TableStartPosition(String),
}

/// One operation of a macro body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Byte index of the operation's token in the normalized source.
    pub source: usize,
}

impl Operation {
    #[inline]
    pub fn new(kind: OperationKind, source: usize) -> Self {
        Self { kind, source }
    }

    pub fn opcode(opcode: u8, source: usize) -> Self {
        Self::new(OperationKind::Opcode(opcode), source)
    }

    /// A minimal-width push of `value`.
    pub fn push(value: &BigUint, source: usize) -> Result<Self, LiteralError> {
        let (opcode, immediate) = encode_push(value)?;
        Ok(Self::new(OperationKind::Push { opcode, immediate }, source))
    }

    pub fn push_jump_label(label: impl Into<String>, source: usize) -> Self {
        Self::new(OperationKind::PushJumpLabel(label.into()), source)
    }

    /// The pushed value, for `Push` operations.
    pub fn push_value(&self) -> Option<BigUint> {
        match &self.kind {
            OperationKind::Push { immediate, .. } => Some(bytes_to_value(immediate)),
            _ => None,
        }
    }
}

/// A named, reusable sequence of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub ops: Vec<Operation>,
    /// Template parameter names, in declaration order.
    pub template_params: Vec<String>,
    /// Raw body text between the braces.
    pub body: String,
    /// Declared `takes(n)` stack inputs.
    pub takes: usize,
    /// Declared `returns(n)` stack outputs.
    pub returns: usize,
    /// Byte index of the `#define` in the normalized source.
    pub source: usize,
}

impl Macro {
    /// Number of template parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.template_params.len()
    }

    /// The value of a constant macro: one that consists of a single push.
    pub fn constant_value(&self) -> Option<BigUint> {
        match self.ops.as_slice() {
            [op] => op.push_value(),
            _ => None,
        }
    }

    /// Names of macros this macro expands directly (calls and code sizes).
    pub fn callees(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match &op.kind {
            OperationKind::MacroCall { name, .. } | OperationKind::CodeSize { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        })
    }
}

/// An ordered block of jump-label offsets appended after the main code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    pub name: String,
    pub labels: Vec<String>,
    /// Compressed tables store 2-byte entries, uncompressed ones 32-byte words.
    pub compressed: bool,
    /// Byte index of the `#define` in the normalized source.
    pub source: usize,
}

impl JumpTable {
    pub const COMPRESSED_ENTRY_SIZE: usize = 2;
    pub const WORD_ENTRY_SIZE: usize = 32;

    /// Size of one encoded entry.
    #[inline]
    pub fn entry_size(&self) -> usize {
        if self.compressed {
            Self::COMPRESSED_ENTRY_SIZE
        } else {
            Self::WORD_ENTRY_SIZE
        }
    }

    /// Total encoded size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.labels.len() * self.entry_size()
    }
}
