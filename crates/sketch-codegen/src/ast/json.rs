// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Decoding of the parser's JSON tree.
//!
//! | JSON | Meaning |
//! |------|---------|
//! | `{"type": k, "arguments": a}` | node of kind `k` |
//! | `[...]` | ordered sequence |
//! | `""` | empty marker |
//!
//! Node arguments are positional, e.g. a function is
//! `[name, [[type, name], ...], returnType, body]`.
//!
//! Multi-word kinds are accepted in both the camelCase and the parser's
//! hyphen/underscore spellings (`ifElse` / `ifelse`, `lt` / `less-than`).

use serde_json::{Map, Value};

use super::{Ast, BinaryOp, Literal, LogicalOp, Node, Param, TypeTag, UnaryOp};
use crate::{Error, Result};

impl Ast {
    /// Parses a JSON document into a tree.
    pub fn from_json(source: &str) -> Result<Ast> {
        let value: Value = serde_json::from_str(source)?;
        Ast::from_value(&value)
    }

    /// Decodes an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Ast> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Ast::from_value)
                .collect::<Result<Vec<_>>>()
                .map(Ast::Sequence),
            Value::String(s) if s.is_empty() => Ok(Ast::Empty),
            Value::Object(map) => decode_node(map).map(Ast::node),
            other => Err(Error::invalid_ast(format!(
                "expected a node, a sequence or \"\", found {other}"
            ))),
        }
    }
}

fn decode_node(map: &Map<String, Value>) -> Result<Node> {
    let kind = match map.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(Value::Number(code)) => return Err(Error::Dispatch(code.to_string())),
        _ => return Err(Error::invalid_ast("node without a \"type\" key")),
    };
    let args = map.get("arguments").unwrap_or(&NULL);

    let node = match kind {
        "program" => Node::Program(Ast::from_value(args)?),
        "block" => Node::Block(Ast::from_value(args)?),
        "function" => {
            let [name, params, return_type, body] = positional::<4>(kind, args)?;
            Node::Function {
                name: string(kind, name)?,
                params: decode_params(params)?,
                return_type: type_tag(kind, return_type)?,
                body: Ast::from_value(body)?,
            }
        }
        "return" => Node::Return(Ast::from_value(args)?),
        "variableDecl" | "variable-decl" => {
            let [ty, name] = positional::<2>(kind, args)?;
            Node::VariableDecl {
                ty: type_tag(kind, ty)?,
                name: string(kind, name)?,
            }
        }
        "variableDeclAssign" | "variable-decl-assign" => {
            let [ty, name, value] = positional::<3>(kind, args)?;
            Node::VariableDeclAssign {
                ty: type_tag(kind, ty)?,
                name: string(kind, name)?,
                value: Ast::from_value(value)?,
            }
        }
        "assign" => {
            let [name, value] = positional::<2>(kind, args)?;
            Node::Assign {
                name: string(kind, name)?,
                value: Ast::from_value(value)?,
            }
        }
        "addAssign" | "add_assign" => compound(kind, BinaryOp::Add, args)?,
        "subAssign" | "sub_assign" => compound(kind, BinaryOp::Sub, args)?,
        "multAssign" | "multi_assign" => compound(kind, BinaryOp::Mul, args)?,
        "divAssign" | "div_assign" => compound(kind, BinaryOp::Div, args)?,
        "modAssign" | "mod_assign" => compound(kind, BinaryOp::Mod, args)?,
        "increment" => Node::Increment(name_arg(kind, args)?),
        "decrement" => Node::Decrement(name_arg(kind, args)?),
        "if" => {
            let [cond, body] = positional::<2>(kind, args)?;
            Node::If {
                cond: Ast::from_value(cond)?,
                body: Ast::from_value(body)?,
            }
        }
        "ifElse" | "ifelse" => {
            let [cond, body, else_body] = positional::<3>(kind, args)?;
            Node::IfElse {
                cond: Ast::from_value(cond)?,
                body: Ast::from_value(body)?,
                else_body: Ast::from_value(else_body)?,
            }
        }
        "while" => {
            let [cond, body] = positional::<2>(kind, args)?;
            Node::While {
                cond: Ast::from_value(cond)?,
                body: Ast::from_value(body)?,
            }
        }
        "doWhile" | "do_while" => {
            let [cond, body] = positional::<2>(kind, args)?;
            Node::DoWhile {
                cond: Ast::from_value(cond)?,
                body: Ast::from_value(body)?,
            }
        }
        "for" => {
            let [init, cond, update, body] = positional::<4>(kind, args)?;
            Node::For {
                init: Ast::from_value(init)?,
                cond: Ast::from_value(cond)?,
                update: Ast::from_value(update)?,
                body: Ast::from_value(body)?,
            }
        }
        "call" => {
            let [name, call_args] = positional::<2>(kind, args)?;
            let call_args = match call_args {
                Value::Array(items) => items
                    .iter()
                    .map(Ast::from_value)
                    .collect::<Result<Vec<_>>>()?,
                Value::String(s) if s.is_empty() => Vec::new(),
                other => vec![Ast::from_value(other)?],
            };
            Node::Call {
                name: string(kind, name)?,
                args: call_args,
            }
        }
        "add" | "addition" => binary(kind, BinaryOp::Add, args)?,
        "sub" | "minus" => binary(kind, BinaryOp::Sub, args)?,
        "mul" | "multiplication" => binary(kind, BinaryOp::Mul, args)?,
        "div" | "division" => binary(kind, BinaryOp::Div, args)?,
        "mod" | "modulo" => binary(kind, BinaryOp::Mod, args)?,
        "eq" | "equality" => binary(kind, BinaryOp::Eq, args)?,
        "neq" | "not-equal" => binary(kind, BinaryOp::Ne, args)?,
        "lt" | "less-than" => binary(kind, BinaryOp::Lt, args)?,
        "le" | "less-than-or-equal" => binary(kind, BinaryOp::Le, args)?,
        "gt" | "larger-than" => binary(kind, BinaryOp::Gt, args)?,
        "ge" | "greater-than-or-equal" => binary(kind, BinaryOp::Ge, args)?,
        "bit-AND" => binary(kind, BinaryOp::BitAnd, args)?,
        "bit-OR" => binary(kind, BinaryOp::BitOr, args)?,
        "bit-XOR" => binary(kind, BinaryOp::BitXor, args)?,
        "bit-left-shift" => binary(kind, BinaryOp::Shl, args)?,
        "bit-right-shift" => binary(kind, BinaryOp::Shr, args)?,
        "zero-fill-right-shift" => binary(kind, BinaryOp::UShr, args)?,
        "and" | "or" => {
            let [lhs, rhs] = positional::<2>(kind, args)?;
            Node::Logical {
                op: if kind == "and" {
                    LogicalOp::And
                } else {
                    LogicalOp::Or
                },
                lhs: Ast::from_value(lhs)?,
                rhs: Ast::from_value(rhs)?,
            }
        }
        "neg" => unary(UnaryOp::Neg, args)?,
        "not" => unary(UnaryOp::Not, args)?,
        "identifier" => Node::Identifier(name_arg(kind, args)?),
        "int" => Node::Literal(Literal::Int(
            args.as_i64()
                .ok_or_else(|| mismatch(kind, "an integer", args))?,
        )),
        "float" => Node::Literal(Literal::Float(
            args.as_f64().ok_or_else(|| mismatch(kind, "a number", args))?,
        )),
        "bool" => Node::Literal(Literal::Bool(
            args.as_bool()
                .ok_or_else(|| mismatch(kind, "a boolean", args))?,
        )),
        "string" => Node::Literal(Literal::Str(string(kind, args)?)),
        other => return Err(Error::Dispatch(other.to_string())),
    };

    Ok(node)
}

static NULL: Value = Value::Null;

fn positional<'a, const N: usize>(kind: &str, args: &'a Value) -> Result<[&'a Value; N]> {
    match args {
        Value::Array(items) if items.len() == N => {
            let mut out = [&NULL; N];
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item;
            }
            Ok(out)
        }
        other => Err(mismatch(kind, &format!("{N} arguments"), other)),
    }
}

fn string(kind: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(kind, "a string", value))
}

fn type_tag(kind: &str, value: &Value) -> Result<TypeTag> {
    string(kind, value).map(TypeTag::new)
}

/// Accepts both `"x"` and `["x"]`.
fn name_arg(kind: &str, args: &Value) -> Result<String> {
    match args {
        Value::Array(items) if items.len() == 1 => string(kind, &items[0]),
        other => string(kind, other),
    }
}

fn decode_params(value: &Value) -> Result<Vec<Param>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let [ty, name] = positional::<2>("parameter", item)?;
                Ok(Param {
                    ty: type_tag("parameter", ty)?,
                    name: string("parameter", name)?,
                })
            })
            .collect(),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        other => Err(mismatch("function", "a parameter list", other)),
    }
}

fn compound(kind: &str, op: BinaryOp, args: &Value) -> Result<Node> {
    let [name, value] = positional::<2>(kind, args)?;
    Ok(Node::CompoundAssign {
        op,
        name: string(kind, name)?,
        value: Ast::from_value(value)?,
    })
}

fn binary(kind: &str, op: BinaryOp, args: &Value) -> Result<Node> {
    let [lhs, rhs] = positional::<2>(kind, args)?;
    Ok(Node::Binary {
        op,
        lhs: Ast::from_value(lhs)?,
        rhs: Ast::from_value(rhs)?,
    })
}

fn unary(op: UnaryOp, args: &Value) -> Result<Node> {
    let operand = match args {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    };
    Ok(Node::Unary {
        op,
        operand: Ast::from_value(operand)?,
    })
}

fn mismatch(kind: &str, expected: &str, found: &Value) -> Error {
    Error::invalid_ast(format!("'{kind}' expects {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Result<Ast> {
        Ast::from_value(&value)
    }

    #[test]
    fn test_decode_empty_marker_and_sequence() {
        assert_eq!(decode(json!("")).unwrap(), Ast::Empty);
        assert_eq!(
            decode(json!(["", []])).unwrap(),
            Ast::Sequence(vec![Ast::Empty, Ast::Sequence(vec![])])
        );
    }

    #[test]
    fn test_decode_function() {
        let ast = decode(json!({
            "type": "function",
            "arguments": ["add", [["int", "a"], ["int", "b"]], "int", ""]
        }))
        .unwrap();

        assert_eq!(
            ast,
            Ast::node(Node::Function {
                name: "add".into(),
                params: vec![Param::new("int", "a"), Param::new("int", "b")],
                return_type: TypeTag::new("int"),
                body: Ast::Empty,
            })
        );
    }

    #[test]
    fn test_decode_binary_and_literals() {
        let ast = decode(json!({
            "type": "add",
            "arguments": [{"type": "int", "arguments": 1}, {"type": "identifier", "arguments": "x"}]
        }))
        .unwrap();

        assert_eq!(
            ast,
            Ast::node(Node::Binary {
                op: BinaryOp::Add,
                lhs: Ast::node(Node::Literal(Literal::Int(1))),
                rhs: Ast::node(Node::Identifier("x".into())),
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_dispatch_error() {
        let err = decode(json!({"type": "switch", "arguments": []})).unwrap_err();
        assert!(matches!(err, Error::Dispatch(kind) if kind == "switch"));

        let err = decode(json!({"type": 42, "arguments": []})).unwrap_err();
        assert!(matches!(err, Error::Dispatch(kind) if kind == "42"));
    }

    #[test]
    fn test_wrong_arity_is_invalid_ast() {
        let err = decode(json!({"type": "assign", "arguments": ["x"]})).unwrap_err();
        assert!(matches!(err, Error::InvalidAst(_)));
    }

    #[test]
    fn test_non_empty_string_is_not_a_node() {
        assert!(matches!(decode(json!("x")), Err(Error::InvalidAst(_))));
    }

    #[test]
    fn test_from_json_reports_syntax_errors() {
        assert!(matches!(Ast::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parser_spellings_decode_like_short_names() {
        let pair = json!([{"type": "int", "arguments": 1}, {"type": "int", "arguments": 2}]);
        let cases = [
            ("addition", "add"),
            ("minus", "sub"),
            ("multiplication", "mul"),
            ("division", "div"),
            ("modulo", "mod"),
            ("equality", "eq"),
            ("not-equal", "neq"),
            ("less-than", "lt"),
            ("larger-than", "gt"),
            ("less-than-or-equal", "le"),
            ("greater-than-or-equal", "ge"),
            ("ifelse", "ifElse"),
            ("do_while", "doWhile"),
        ];
        for (long, short) in cases {
            let args = match short {
                "ifElse" => json!([{"type": "bool", "arguments": true}, "", ""]),
                "doWhile" => json!([{"type": "bool", "arguments": true}, ""]),
                _ => pair.clone(),
            };
            assert_eq!(
                decode(json!({"type": long, "arguments": args.clone()})).unwrap(),
                decode(json!({"type": short, "arguments": args})).unwrap(),
                "{long}"
            );
        }
    }

    #[test]
    fn test_parser_spellings_for_declarations_and_compound_assignment() {
        let value = json!({"type": "int", "arguments": 3});
        let cases = [
            ("variable-decl", "variableDecl", json!(["int", "x"])),
            ("variable-decl-assign", "variableDeclAssign", json!(["int", "x", value])),
            ("add_assign", "addAssign", json!(["x", value])),
            ("sub_assign", "subAssign", json!(["x", value])),
            ("multi_assign", "multAssign", json!(["x", value])),
            ("div_assign", "divAssign", json!(["x", value])),
            ("mod_assign", "modAssign", json!(["x", value])),
        ];
        for (long, short, args) in cases {
            assert_eq!(
                decode(json!({"type": long, "arguments": args.clone()})).unwrap(),
                decode(json!({"type": short, "arguments": args})).unwrap(),
                "{long}"
            );
        }
    }

    #[test]
    fn test_decode_bitwise_operators() {
        let cases = [
            ("bit-AND", BinaryOp::BitAnd),
            ("bit-OR", BinaryOp::BitOr),
            ("bit-XOR", BinaryOp::BitXor),
            ("bit-left-shift", BinaryOp::Shl),
            ("bit-right-shift", BinaryOp::Shr),
            ("zero-fill-right-shift", BinaryOp::UShr),
        ];
        for (kind, op) in cases {
            let ast = decode(json!({
                "type": kind,
                "arguments": [
                    {"type": "identifier", "arguments": "x"},
                    {"type": "int", "arguments": 2}
                ]
            }))
            .unwrap();
            assert_eq!(
                ast,
                Ast::node(Node::Binary {
                    op,
                    lhs: Ast::node(Node::Identifier("x".into())),
                    rhs: Ast::node(Node::Literal(Literal::Int(2))),
                })
            );
            let Ast::Node(node) = &ast else {
                panic!("{kind} did not decode to a node");
            };
            assert_eq!(node.kind(), kind);
        }
    }
}
