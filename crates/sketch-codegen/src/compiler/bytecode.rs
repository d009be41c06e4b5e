// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bytecode definitions and the code store.
//!
//! The MVM consumes a flat sequence of [`CodeWord`]s. An instruction is an
//! opcode word followed by [`OpCode::operand_count`] literal words; the
//! position of a word in the store is its [`Address`].

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Index into the code store.
pub type Address = usize;

/// Operation codes understood by the MVM.
///
/// The numeric values are the VM's wire encoding and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// No operation
    Nop = 0,
    /// Stop execution
    Halt = 1,

    // Scope bracketing
    /// Allocate a fresh data frame on the VM's scope chain
    EnterScope = 2,
    /// Discard the innermost data frame
    ExitScope = 3,

    // Stack operations
    /// Push the following literal word
    Push = 4,
    /// Pop the top value
    Pop = 5,
    /// Duplicate the top value
    Dup = 6,

    // Variable operations
    /// Push the value at `(depth, slot)`
    Load = 7,
    /// Pop into `(depth, slot)`
    Store = 8,

    // Arithmetic operations
    /// Add top two values
    Add = 9,
    /// Subtract
    Sub = 10,
    /// Multiply
    Mul = 11,
    /// Divide
    Div = 12,
    /// Modulo
    Mod = 13,
    /// Negate
    Neg = 14,

    // Comparison operations
    /// Equal
    Eq = 15,
    /// Not equal
    Ne = 16,
    /// Less than
    Lt = 17,
    /// Less than or equal
    Le = 18,
    /// Greater than
    Gt = 19,
    /// Greater than or equal
    Ge = 20,

    // Logical operations
    /// Logical NOT
    Not = 21,

    // Control flow
    /// Unconditional jump to the following address
    Jump = 22,
    /// Pop; jump if false
    JumpIfFalse = 23,
    /// Pop; jump if true
    JumpIfTrue = 24,

    // Function operations
    /// Call the function at the following address with the given argument count
    Call = 25,
    /// Return a unit value to the caller
    Return = 26,
    /// Pop and return the top value to the caller
    ReturnValue = 27,

    // Bitwise operations
    /// Bitwise AND
    BitAnd = 28,
    /// Bitwise OR
    BitOr = 29,
    /// Bitwise XOR
    BitXor = 30,
    /// Shift left
    Shl = 31,
    /// Sign-propagating shift right
    Shr = 32,
    /// Zero-fill shift right
    UShr = 33,
}

impl OpCode {
    /// Number of literal words following this opcode in the code store.
    pub fn operand_count(self) -> usize {
        match self {
            OpCode::Push | OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue => 1,
            OpCode::Load | OpCode::Store | OpCode::Call => 2,
            _ => 0,
        }
    }

    /// Assembly mnemonic used by the disassembler.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Halt => "HALT",
            OpCode::EnterScope => "PUSHSC",
            OpCode::ExitScope => "POPSC",
            OpCode::Push => "PUSH",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::Load => "LOAD",
            OpCode::Store => "STORE",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Neg => "NEG",
            OpCode::Eq => "EQ",
            OpCode::Ne => "NE",
            OpCode::Lt => "LT",
            OpCode::Le => "LE",
            OpCode::Gt => "GT",
            OpCode::Ge => "GE",
            OpCode::Not => "NOT",
            OpCode::Jump => "JMP",
            OpCode::JumpIfFalse => "JMPF",
            OpCode::JumpIfTrue => "JMPT",
            OpCode::Call => "CALL",
            OpCode::Return => "RET",
            OpCode::ReturnValue => "RETV",
            OpCode::BitAnd => "BAND",
            OpCode::BitOr => "BOR",
            OpCode::BitXor => "BXOR",
            OpCode::Shl => "SHL",
            OpCode::Shr => "SHR",
            OpCode::UShr => "USHR",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> std::result::Result<Self, u8> {
        const TABLE: [OpCode; 34] = [
            OpCode::Nop,
            OpCode::Halt,
            OpCode::EnterScope,
            OpCode::ExitScope,
            OpCode::Push,
            OpCode::Pop,
            OpCode::Dup,
            OpCode::Load,
            OpCode::Store,
            OpCode::Add,
            OpCode::Sub,
            OpCode::Mul,
            OpCode::Div,
            OpCode::Mod,
            OpCode::Neg,
            OpCode::Eq,
            OpCode::Ne,
            OpCode::Lt,
            OpCode::Le,
            OpCode::Gt,
            OpCode::Ge,
            OpCode::Not,
            OpCode::Jump,
            OpCode::JumpIfFalse,
            OpCode::JumpIfTrue,
            OpCode::Call,
            OpCode::Return,
            OpCode::ReturnValue,
            OpCode::BitAnd,
            OpCode::BitOr,
            OpCode::BitXor,
            OpCode::Shl,
            OpCode::Shr,
            OpCode::UShr,
        ];
        TABLE.get(byte as usize).copied().ok_or(byte)
    }
}

impl Serialize for OpCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A single word of the code store: an opcode or an inline literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CodeWord {
    /// An operation code
    Op(OpCode),
    /// Integer literal, also used for frame depths, slots and argument counts
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
    /// String literal
    Str(String),
    /// Code address (jump and call targets)
    Addr(Address),
}

impl From<OpCode> for CodeWord {
    fn from(op: OpCode) -> Self {
        CodeWord::Op(op)
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeWord::Op(op) => write!(f, "{}", op.mnemonic()),
            CodeWord::Int(n) => write!(f, "{n}"),
            CodeWord::Float(x) => write!(f, "{x:?}"),
            CodeWord::Bool(b) => write!(f, "{b}"),
            CodeWord::Str(s) => write!(f, "{s:?}"),
            CodeWord::Addr(a) => write!(f, "@{a:04}"),
        }
    }
}

/// Append-only code store with point patching.
#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    words: Vec<CodeWord>,
}

impl CodeBuffer {
    /// Creates a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a word and returns the address it was written to.
    pub fn emit(&mut self, word: impl Into<CodeWord>) -> Address {
        let address = self.words.len();
        self.words.push(word.into());
        address
    }

    /// Reserves an address word to be filled in by [`CodeBuffer::patch_address`].
    pub fn emit_placeholder(&mut self) -> Address {
        self.emit(CodeWord::Addr(0))
    }

    /// Overwrites an already emitted word. The buffer length never changes.
    pub fn patch(&mut self, address: Address, word: impl Into<CodeWord>) -> Result<()> {
        let len = self.words.len();
        match self.words.get_mut(address) {
            Some(slot) => {
                *slot = word.into();
                Ok(())
            }
            None => Err(Error::PatchOutOfRange { address, len }),
        }
    }

    /// Fills a reserved placeholder with a code address.
    pub fn patch_address(&mut self, address: Address, target: Address) -> Result<()> {
        self.patch(address, CodeWord::Addr(target))
    }

    /// The address the next [`CodeBuffer::emit`] will use.
    pub fn current_address(&self) -> Address {
        self.words.len()
    }

    /// Reads the word at `address`.
    pub fn get(&self, address: Address) -> Option<&CodeWord> {
        self.words.get(address)
    }

    /// Number of words emitted so far.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Empties the buffer; the next emit goes to address 0.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Consumes the buffer, yielding the code words.
    pub fn into_words(self) -> Vec<CodeWord> {
        self.words
    }
}

/// The immutable result of one compile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledProgram {
    /// The code store
    pub code: Vec<CodeWord>,
    /// Address of the top-level `init` function, if defined
    #[serde(rename = "initAddr")]
    pub init_address: Option<Address>,
    /// Address of the top-level `render` function, if defined
    #[serde(rename = "renderAddr")]
    pub render_address: Option<Address>,
}
