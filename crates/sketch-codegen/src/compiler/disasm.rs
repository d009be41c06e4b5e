// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Human-readable listings of compiled programs.

use std::fmt::Write;

use super::bytecode::{CodeWord, CompiledProgram};

/// Renders one line per instruction, marking the entry points.
///
/// ```text
/// 0000  <init>
/// 0000  PUSH 1
/// 0002  RETV
/// ```
pub fn disassemble(program: &CompiledProgram) -> String {
    let mut out = String::new();
    let code = &program.code;
    let mut offset = 0;

    while let Some((text, size)) = disassemble_instruction(code, offset) {
        if program.init_address == Some(offset) {
            let _ = writeln!(out, "{offset:04}  <init>");
        }
        if program.render_address == Some(offset) {
            let _ = writeln!(out, "{offset:04}  <render>");
        }

        let _ = writeln!(out, "{offset:04}  {text}");
        offset += size;
    }

    out
}

/// Renders the instruction at `offset`; returns the text and its word count,
/// or `None` past the end of `code`.
pub fn disassemble_instruction(code: &[CodeWord], offset: usize) -> Option<(String, usize)> {
    let op = match code.get(offset)? {
        CodeWord::Op(op) => *op,
        other => return Some((format!(".word {other}"), 1)),
    };

    let mut text = op.mnemonic().to_string();
    let wanted = op.operand_count();
    let operands = &code[offset + 1..code.len().min(offset + 1 + wanted)];
    for word in operands {
        let _ = write!(text, " {word}");
    }
    if operands.len() < wanted {
        text.push_str(" <truncated>");
    }

    Some((text, 1 + operands.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::bytecode::OpCode;

    #[test]
    fn test_disassemble_marks_entry_points() {
        let program = CompiledProgram {
            code: vec![
                CodeWord::Op(OpCode::Return),
                CodeWord::Op(OpCode::Push),
                CodeWord::Int(7),
                CodeWord::Op(OpCode::ReturnValue),
            ],
            init_address: Some(0),
            render_address: Some(1),
        };

        let text = disassemble(&program);
        assert_eq!(
            text,
            "0000  <init>\n0000  RET\n0001  <render>\n0001  PUSH 7\n0003  RETV\n"
        );
    }

    #[test]
    fn test_stray_literal_and_truncated_operands() {
        let code = vec![CodeWord::Str("x".into()), CodeWord::Op(OpCode::Load), CodeWord::Int(0)];
        assert_eq!(
            disassemble_instruction(&code, 0),
            Some((".word \"x\"".to_string(), 1))
        );
        assert_eq!(
            disassemble_instruction(&code, 1),
            Some(("LOAD 0 <truncated>".to_string(), 2))
        );
    }

    #[test]
    fn test_offset_past_end() {
        assert_eq!(disassemble_instruction(&[], 0), None);
        let code = vec![CodeWord::Op(OpCode::Return)];
        assert_eq!(disassemble_instruction(&code, 1), None);
        assert_eq!(disassemble_instruction(&code, 99), None);
    }

    #[test]
    fn test_empty_program_lists_nothing() {
        let program = CompiledProgram {
            code: vec![],
            init_address: None,
            render_address: None,
        };
        assert_eq!(disassemble(&program), "");
    }

    #[test]
    fn test_bitwise_mnemonics() {
        let code = vec![CodeWord::Op(OpCode::UShr)];
        assert_eq!(disassemble_instruction(&code, 0), Some(("USHR".to_string(), 1)));
    }

    #[test]
    fn test_jump_targets_render_as_addresses() {
        let code = vec![CodeWord::Op(OpCode::Jump), CodeWord::Addr(12)];
        assert_eq!(disassemble_instruction(&code, 0).unwrap().0, "JMP @0012");
    }
}
