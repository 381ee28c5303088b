//! EVM opcode table.
//!
//! The compiler only needs opcode byte values, never their execution
//! semantics. Mnemonics are the lowercase names Huff source uses
//! (`sha3`, `pc`, `difficulty`, ...).

use num_enum::IntoPrimitive;

/// Base for the push family: `PUSHn` is `PUSH_BASE + n` for `n` in 1..=32.
pub const PUSH_BASE: u8 = 0x5f;

/// Opcode marking a valid jump target.
pub const JUMPDEST: u8 = OpCode::JumpDest as u8;

/// Push used for every 2-byte placeholder slot (jump labels, table starts).
pub const PLACEHOLDER_PUSH: u8 = OpCode::Push2 as u8;

/// Maximum number of immediate bytes a push can carry.
pub const MAX_PUSH_WIDTH: usize = 32;

/// Opcode of the push carrying `width` immediate bytes.
///
/// Returns `None` outside 1..=32.
#[inline]
pub fn push_opcode(width: usize) -> Option<u8> {
    (1..=MAX_PUSH_WIDTH)
        .contains(&width)
        .then(|| PUSH_BASE + width as u8)
}


macro_rules! opcodes {
    ($($variant:ident = $value:literal => $mnemonic:literal,)*) => {
        /// EVM opcodes addressable by mnemonic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
        #[repr(u8)]
        pub enum OpCode {
            $($variant = $value,)*
        }

        impl OpCode {
            /// Look up an opcode by its source mnemonic.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                match mnemonic {
                    $($mnemonic => Some(OpCode::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    Stop = 0x00 => "stop",
    Add = 0x01 => "add",
    Mul = 0x02 => "mul",
    Sub = 0x03 => "sub",
    Div = 0x04 => "div",
    SDiv = 0x05 => "sdiv",
    Mod = 0x06 => "mod",
    SMod = 0x07 => "smod",
    AddMod = 0x08 => "addmod",
    MulMod = 0x09 => "mulmod",
    Exp = 0x0a => "exp",
    SignExtend = 0x0b => "signextend",
    Lt = 0x10 => "lt",
    Gt = 0x11 => "gt",
    SLt = 0x12 => "slt",
    SGt = 0x13 => "sgt",
    Eq = 0x14 => "eq",
    IsZero = 0x15 => "iszero",
    And = 0x16 => "and",
    Or = 0x17 => "or",
    Xor = 0x18 => "xor",
    Not = 0x19 => "not",
    Byte = 0x1a => "byte",
    Shl = 0x1b => "shl",
    Shr = 0x1c => "shr",
    Sar = 0x1d => "sar",
    Sha3 = 0x20 => "sha3",
    Address = 0x30 => "address",
    Balance = 0x31 => "balance",
    Origin = 0x32 => "origin",
    Caller = 0x33 => "caller",
    CallValue = 0x34 => "callvalue",
    CallDataLoad = 0x35 => "calldataload",
    CallDataSize = 0x36 => "calldatasize",
    CallDataCopy = 0x37 => "calldatacopy",
    CodeSize = 0x38 => "codesize",
    CodeCopy = 0x39 => "codecopy",
    GasPrice = 0x3a => "gasprice",
    ExtCodeSize = 0x3b => "extcodesize",
    ExtCodeCopy = 0x3c => "extcodecopy",
    ReturnDataSize = 0x3d => "returndatasize",
    ReturnDataCopy = 0x3e => "returndatacopy",
    ExtCodeHash = 0x3f => "extcodehash",
    BlockHash = 0x40 => "blockhash",
    Coinbase = 0x41 => "coinbase",
    Timestamp = 0x42 => "timestamp",
    Number = 0x43 => "number",
    Difficulty = 0x44 => "difficulty",
    GasLimit = 0x45 => "gaslimit",
    Pop = 0x50 => "pop",
    MLoad = 0x51 => "mload",
    MStore = 0x52 => "mstore",
    MStore8 = 0x53 => "mstore8",
    SLoad = 0x54 => "sload",
    SStore = 0x55 => "sstore",
    Jump = 0x56 => "jump",
    JumpI = 0x57 => "jumpi",
    Pc = 0x58 => "pc",
    MSize = 0x59 => "msize",
    Gas = 0x5a => "gas",
    JumpDest = 0x5b => "jumpdest",
    Push1 = 0x60 => "push1",
    Push2 = 0x61 => "push2",
    Push3 = 0x62 => "push3",
    Push4 = 0x63 => "push4",
    Push5 = 0x64 => "push5",
    Push6 = 0x65 => "push6",
    Push7 = 0x66 => "push7",
    Push8 = 0x67 => "push8",
    Push9 = 0x68 => "push9",
    Push10 = 0x69 => "push10",
    Push11 = 0x6a => "push11",
    Push12 = 0x6b => "push12",
    Push13 = 0x6c => "push13",
    Push14 = 0x6d => "push14",
    Push15 = 0x6e => "push15",
    Push16 = 0x6f => "push16",
    Push17 = 0x70 => "push17",
    Push18 = 0x71 => "push18",
    Push19 = 0x72 => "push19",
    Push20 = 0x73 => "push20",
    Push21 = 0x74 => "push21",
    Push22 = 0x75 => "push22",
    Push23 = 0x76 => "push23",
    Push24 = 0x77 => "push24",
    Push25 = 0x78 => "push25",
    Push26 = 0x79 => "push26",
    Push27 = 0x7a => "push27",
    Push28 = 0x7b => "push28",
    Push29 = 0x7c => "push29",
    Push30 = 0x7d => "push30",
    Push31 = 0x7e => "push31",
    Push32 = 0x7f => "push32",
    Dup1 = 0x80 => "dup1",
    Dup2 = 0x81 => "dup2",
    Dup3 = 0x82 => "dup3",
    Dup4 = 0x83 => "dup4",
    Dup5 = 0x84 => "dup5",
    Dup6 = 0x85 => "dup6",
    Dup7 = 0x86 => "dup7",
    Dup8 = 0x87 => "dup8",
    Dup9 = 0x88 => "dup9",
    Dup10 = 0x89 => "dup10",
    Dup11 = 0x8a => "dup11",
    Dup12 = 0x8b => "dup12",
    Dup13 = 0x8c => "dup13",
    Dup14 = 0x8d => "dup14",
    Dup15 = 0x8e => "dup15",
    Dup16 = 0x8f => "dup16",
    Swap1 = 0x90 => "swap1",
    Swap2 = 0x91 => "swap2",
    Swap3 = 0x92 => "swap3",
    Swap4 = 0x93 => "swap4",
    Swap5 = 0x94 => "swap5",
    Swap6 = 0x95 => "swap6",
    Swap7 = 0x96 => "swap7",
    Swap8 = 0x97 => "swap8",
    Swap9 = 0x98 => "swap9",
    Swap10 = 0x99 => "swap10",
    Swap11 = 0x9a => "swap11",
    Swap12 = 0x9b => "swap12",
    Swap13 = 0x9c => "swap13",
    Swap14 = 0x9d => "swap14",
    Swap15 = 0x9e => "swap15",
    Swap16 = 0x9f => "swap16",
    Log0 = 0xa0 => "log0",
    Log1 = 0xa1 => "log1",
    Log2 = 0xa2 => "log2",
    Log3 = 0xa3 => "log3",
    Log4 = 0xa4 => "log4",
    Create = 0xf0 => "create",
    Call = 0xf1 => "call",
    CallCode = 0xf2 => "callcode",
    Return = 0xf3 => "return",
    DelegateCall = 0xf4 => "delegatecall",
    Create2 = 0xf5 => "create2",
    StaticCall = 0xfa => "staticcall",
    Revert = 0xfd => "revert",
    Invalid = 0xfe => "invalid",
    SelfDestruct = 0xff => "selfdestruct",
}

impl OpCode {
    /// The opcode byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self.into()
    }
}
