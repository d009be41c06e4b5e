//! End-to-end code generation tests
//!
//! Feed parser-shaped JSON trees through the public API.

use serde_json::{Value, json};
use sketch_codegen::compiler::CodeWord;
use sketch_codegen::{Ast, Compiler, CompilerConfig, Error, OpCode, compile_json, disassemble};

fn node(kind: &str, args: Value) -> Value {
    json!({"type": kind, "arguments": args})
}

fn int(n: i64) -> Value {
    node("int", json!(n))
}

/// A small animated scene: a global counter, a helper defined after its
/// first use, and both entry points.
fn scene() -> Value {
    node(
        "program",
        json!([
            node("variableDeclAssign", json!(["int", "frame", int(0)])),
            node("function", json!(["init", [], "void", [
                node("assign", json!(["frame", node("call", json!(["start", []]))]))
            ]])),
            node("function", json!(["render", [], "void", [
                node("for", json!([
                    node("variableDeclAssign", json!(["int", "i", int(0)])),
                    node("lt", json!([node("identifier", json!("i")), int(4)])),
                    node("increment", json!("i")),
                    [node("addAssign", json!(["frame", node("identifier", json!("i"))]))]
                ])),
                node("if", json!([
                    node("gt", json!([node("identifier", json!("frame")), int(100)])),
                    [node("assign", json!(["frame", int(0)]))]
                ]))
            ]])),
            node("function", json!(["start", [], "int", [node("return", int(1))]])),
        ]),
    )
}

#[test]
fn test_scene_compiles_with_entry_points() {
    let ast = Ast::from_value(&scene()).unwrap();
    let program = Compiler::new().compile(&ast).unwrap();

    // frame = 0 occupies 0..5, init follows immediately
    assert_eq!(program.init_address, Some(5));
    assert!(program.render_address.unwrap() > 5);

    // init: CALL start 0, STORE 1 0, RET
    let code = &program.code;
    assert_eq!(code[5], CodeWord::Op(OpCode::Call));
    assert_eq!(code[7], CodeWord::Int(0));
    assert_eq!(
        &code[8..12],
        &[
            CodeWord::Op(OpCode::Store),
            CodeWord::Int(1),
            CodeWord::Int(0),
            CodeWord::Op(OpCode::Return),
        ]
    );

    // The forward call was patched to the helper, which is the last function
    let CodeWord::Addr(target) = code[6] else {
        panic!("call target is not an address: {:?}", code[6]);
    };
    assert_eq!(
        &code[target..],
        &[
            CodeWord::Op(OpCode::Push),
            CodeWord::Int(1),
            CodeWord::Op(OpCode::ReturnValue),
            CodeWord::Op(OpCode::Return),
        ]
    );
}

#[test]
fn test_loop_variable_is_two_frames_from_global() {
    let ast = Ast::from_value(&scene()).unwrap();
    let program = Compiler::new().compile(&ast).unwrap();
    let render = program.render_address.unwrap();

    // render: PUSHSC, i = 0, then the condition loads i at depth 0
    assert_eq!(program.code[render], CodeWord::Op(OpCode::EnterScope));
    assert_eq!(
        &program.code[render + 6..render + 9],
        &[CodeWord::Op(OpCode::Load), CodeWord::Int(0), CodeWord::Int(0)]
    );

    // frame += i inside the loop body addresses the global through the
    // loop frame and the function frame
    let listing = disassemble(&program);
    assert!(listing.contains("LOAD 2 0"), "{listing}");
    assert!(listing.contains("STORE 2 0"), "{listing}");
}

#[test]
fn test_program_node_matches_bare_sequence() {
    let wrapped = Ast::from_value(&scene()).unwrap();
    let bare = Ast::from_value(&scene()["arguments"]).unwrap();

    let mut compiler = Compiler::new();
    assert_eq!(
        compiler.compile(&wrapped).unwrap(),
        compiler.compile(&bare).unwrap()
    );
}

#[test]
fn test_json_output_shape() {
    let source = r#"[{"type": "function", "arguments": ["render", [], "void", [
        {"type": "return", "arguments": ""}
    ]]}]"#;
    let program = compile_json(source, CompilerConfig::default()).unwrap();

    assert_eq!(
        serde_json::to_value(&program).unwrap(),
        json!({"code": [26, 26], "initAddr": null, "renderAddr": 0})
    );
}

#[test]
fn test_literals_serialize_inline() {
    let source = json!([
        node("not", node("bool", json!(true))),
        node("neg", node("float", json!(2.5))),
        node("string", json!("hi")),
    ]);
    let program = compile_json(&source.to_string(), CompilerConfig::default()).unwrap();

    assert_eq!(
        serde_json::to_value(&program.code).unwrap(),
        json!([4, true, 21, 5, 4, 2.5, 14, 5, 4, "hi", 5])
    );
}

#[test]
fn test_halt_terminates_program() {
    let config = CompilerConfig {
        emit_halt: true,
        ..CompilerConfig::default()
    };
    let program = compile_json(&scene().to_string(), config).unwrap();
    assert_eq!(program.code.last(), Some(&CodeWord::Op(OpCode::Halt)));
}

#[test]
fn test_forward_calls_can_be_disabled() {
    let config = CompilerConfig {
        forward_calls: false,
        ..CompilerConfig::default()
    };
    let err = compile_json(&scene().to_string(), config).unwrap_err();
    assert_eq!(err.to_string(), "Unresolved reference to 'start'");
}

#[test]
fn test_error_messages() {
    let redefined = json!([
        node("function", json!(["init", [], "void", ""])),
        node("variableDecl", json!(["int", "init"])),
    ]);
    let err = compile_json(&redefined.to_string(), CompilerConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Illegal attempt to redefine 'init' in the same scope"
    );

    let stray_return = json!([node("return", int(1))]);
    let err = compile_json(&stray_return.to_string(), CompilerConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Context));

    let unknown = json!([node("switch", json!([]))]);
    let err = compile_json(&unknown.to_string(), CompilerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "No code generator for node kind 'switch'");
}

#[test]
fn test_program_without_entry_points() {
    let source = json!([node("variableDeclAssign", json!(["int", "render", int(1)]))]);
    let program = compile_json(&source.to_string(), CompilerConfig::default()).unwrap();
    assert_eq!(program.init_address, None);
    assert_eq!(program.render_address, None);
    assert!(!program.code.is_empty());
}
