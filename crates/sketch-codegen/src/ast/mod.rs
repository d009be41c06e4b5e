// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Abstract Syntax Tree for Sketch programs.
//!
//! The parser hands over a tree of `{type, arguments}` objects; [`json`]
//! decodes it into the closed [`Node`] enum so the code generator can
//! dispatch with an exhaustive `match`.

mod json;

use std::fmt;

use crate::compiler::bytecode::OpCode;

/// A position in the tree: one node, an ordered sequence, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A single node
    Node(Box<Node>),
    /// Nodes generated in order
    Sequence(Vec<Ast>),
    /// The explicit empty marker (`""` in the parser output)
    Empty,
}

impl Ast {
    /// Wraps a node.
    pub fn node(node: Node) -> Self {
        Ast::Node(Box::new(node))
    }

    /// Whether this is the empty marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Ast::Empty)
    }
}

impl From<Node> for Ast {
    fn from(node: Node) -> Self {
        Ast::node(node)
    }
}

impl From<Vec<Ast>> for Ast {
    fn from(items: Vec<Ast>) -> Self {
        Ast::Sequence(items)
    }
}

/// A declared type name (`int`, `float`, `void`, ...).
///
/// The set of type names belongs to the language front end; the generator
/// treats them as opaque tags apart from recognising `void`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag(String);

impl TypeTag {
    /// Creates a type tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `void` return type.
    pub fn void() -> Self {
        Self::new("void")
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        self.0 == "void"
    }

    /// The type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Declared type
    pub ty: TypeTag,
    /// Parameter name
    pub name: String,
}

impl Param {
    /// Creates a parameter.
    pub fn new(ty: impl Into<TypeTag>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }
}

/// Binary operators with a direct opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
}

impl BinaryOp {
    /// The opcode implementing this operator.
    pub fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Sub,
            BinaryOp::Mul => OpCode::Mul,
            BinaryOp::Div => OpCode::Div,
            BinaryOp::Mod => OpCode::Mod,
            BinaryOp::Eq => OpCode::Eq,
            BinaryOp::Ne => OpCode::Ne,
            BinaryOp::Lt => OpCode::Lt,
            BinaryOp::Le => OpCode::Le,
            BinaryOp::Gt => OpCode::Gt,
            BinaryOp::Ge => OpCode::Ge,
            BinaryOp::BitAnd => OpCode::BitAnd,
            BinaryOp::BitOr => OpCode::BitOr,
            BinaryOp::BitXor => OpCode::BitXor,
            BinaryOp::Shl => OpCode::Shl,
            BinaryOp::Shr => OpCode::Shr,
            BinaryOp::UShr => OpCode::UShr,
        }
    }
}

/// Short-circuit operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Logical NOT
    Not,
}

impl UnaryOp {
    /// The opcode implementing this operator.
    pub fn opcode(self) -> OpCode {
        match self {
            UnaryOp::Neg => OpCode::Neg,
            UnaryOp::Not => OpCode::Not,
        }
    }
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
    /// String literal
    Str(String),
}

/// Every node kind the Sketch parser produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Program root
    Program(Ast),
    /// Braced block with its own scope
    Block(Ast),
    /// Function definition
    Function {
        /// Function name
        name: String,
        /// Parameters in declaration order
        params: Vec<Param>,
        /// Declared return type
        return_type: TypeTag,
        /// Function body
        body: Ast,
    },
    /// `return` with an optional value ([`Ast::Empty`] when absent)
    Return(Ast),
    /// `int x;`
    VariableDecl {
        /// Declared type
        ty: TypeTag,
        /// Variable name
        name: String,
    },
    /// `int x = e;`
    VariableDeclAssign {
        /// Declared type
        ty: TypeTag,
        /// Variable name
        name: String,
        /// Initializer
        value: Ast,
    },
    /// `x = e`
    Assign {
        /// Target variable
        name: String,
        /// Assigned value
        value: Ast,
    },
    /// `x += e` and friends
    CompoundAssign {
        /// Arithmetic operator applied before the store
        op: BinaryOp,
        /// Target variable
        name: String,
        /// Right-hand operand
        value: Ast,
    },
    /// `x++`
    Increment(String),
    /// `x--`
    Decrement(String),
    /// `if (cond) body`
    If {
        /// Condition
        cond: Ast,
        /// Taken branch
        body: Ast,
    },
    /// `if (cond) body else else_body`
    IfElse {
        /// Condition
        cond: Ast,
        /// Taken branch
        body: Ast,
        /// Fallback branch
        else_body: Ast,
    },
    /// `while (cond) body`
    While {
        /// Condition
        cond: Ast,
        /// Loop body
        body: Ast,
    },
    /// `do body while (cond)`
    DoWhile {
        /// Condition
        cond: Ast,
        /// Loop body
        body: Ast,
    },
    /// `for (init; cond; update) body`
    For {
        /// Loop-scoped initializer
        init: Ast,
        /// Condition; [`Ast::Empty`] loops forever
        cond: Ast,
        /// Update clause
        update: Ast,
        /// Loop body
        body: Ast,
    },
    /// `f(a, b)`
    Call {
        /// Callee name
        name: String,
        /// Arguments in order
        args: Vec<Ast>,
    },
    /// Arithmetic and comparison
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Ast,
        /// Right operand
        rhs: Ast,
    },
    /// `&&` and `||`
    Logical {
        /// Operator
        op: LogicalOp,
        /// Left operand
        lhs: Ast,
        /// Right operand, evaluated only when needed
        rhs: Ast,
    },
    /// `-e` and `!e`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Ast,
    },
    /// Variable reference
    Identifier(String),
    /// Literal value
    Literal(Literal),
}

impl Node {
    /// The parser's name for this node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Program(_) => "program",
            Node::Block(_) => "block",
            Node::Function { .. } => "function",
            Node::Return(_) => "return",
            Node::VariableDecl { .. } => "variableDecl",
            Node::VariableDeclAssign { .. } => "variableDeclAssign",
            Node::Assign { .. } => "assign",
            Node::CompoundAssign { op, .. } => match op {
                BinaryOp::Add => "addAssign",
                BinaryOp::Sub => "subAssign",
                BinaryOp::Mul => "multAssign",
                BinaryOp::Div => "divAssign",
                BinaryOp::Mod => "modAssign",
                _ => "compoundAssign",
            },
            Node::Increment(_) => "increment",
            Node::Decrement(_) => "decrement",
            Node::If { .. } => "if",
            Node::IfElse { .. } => "ifElse",
            Node::While { .. } => "while",
            Node::DoWhile { .. } => "doWhile",
            Node::For { .. } => "for",
            Node::Call { .. } => "call",
            Node::Binary { op, .. } => match op {
                BinaryOp::Add => "add",
                BinaryOp::Sub => "sub",
                BinaryOp::Mul => "mul",
                BinaryOp::Div => "div",
                BinaryOp::Mod => "mod",
                BinaryOp::Eq => "eq",
                BinaryOp::Ne => "neq",
                BinaryOp::Lt => "lt",
                BinaryOp::Le => "le",
                BinaryOp::Gt => "gt",
                BinaryOp::Ge => "ge",
                BinaryOp::BitAnd => "bit-AND",
                BinaryOp::BitOr => "bit-OR",
                BinaryOp::BitXor => "bit-XOR",
                BinaryOp::Shl => "bit-left-shift",
                BinaryOp::Shr => "bit-right-shift",
                BinaryOp::UShr => "zero-fill-right-shift",
            },
            Node::Logical { op, .. } => match op {
                LogicalOp::And => "and",
                LogicalOp::Or => "or",
            },
            Node::Unary { op, .. } => match op {
                UnaryOp::Neg => "neg",
                UnaryOp::Not => "not",
            },
            Node::Identifier(_) => "identifier",
            Node::Literal(lit) => match lit {
                Literal::Int(_) => "int",
                Literal::Float(_) => "float",
                Literal::Bool(_) => "bool",
                Literal::Str(_) => "string",
            },
        }
    }
}
