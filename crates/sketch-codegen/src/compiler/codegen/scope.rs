// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Scope management for label resolution during compilation.
//!
//! Every lexical scope owns one [`ScopeFrame`]: a label table plus a data
//! slot allocator. Variables are addressed at runtime by
//! `(relative depth, slot)`, so [`Resolved::relative_depth`] must match the
//! number of frames the VM walks outward.

use rustc_hash::FxHashMap;

use crate::ast::{Param, TypeTag};
use crate::compiler::bytecode::Address;
use crate::{Error, Result};

/// What a label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelKind {
    /// A function; the label address is its first code word
    Function,
    /// A variable of the given declared type; the label address is its data slot
    Variable(TypeTag),
}

impl LabelKind {
    /// Whether this names a function.
    pub fn is_function(&self) -> bool {
        matches!(self, LabelKind::Function)
    }
}

/// Auxiliary data carried by function labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// Parameters in declaration order
    pub params: Vec<Param>,
    /// Declared return type
    pub return_type: TypeTag,
}

/// A named reference to a code address or a data slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Code address (functions) or data slot (variables)
    pub address: Address,
    /// What the label names
    pub kind: LabelKind,
    /// Signature for function labels
    pub extra: Option<FunctionSignature>,
}

/// A call emitted before its callee was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    /// Callee name
    pub name: String,
    /// Address of the placeholder holding the call target
    pub patch_at: Address,
}

/// One lexical scope.
#[derive(Debug, Default)]
pub struct ScopeFrame {
    labels: FxHashMap<String, Label>,
    next_data: usize,
    pending: Vec<PendingCall>,
}

impl ScopeFrame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a label defined in this frame only.
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    /// Number of data slots handed out so far.
    pub fn data_slots(&self) -> usize {
        self.next_data
    }

    /// Number of labels defined in this frame.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no label is defined in this frame.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Removes and returns the calls still waiting for a target.
    pub fn take_pending(&mut self) -> Vec<PendingCall> {
        std::mem::take(&mut self.pending)
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// The label found
    pub label: &'a Label,
    /// Frames between the lookup site and the defining frame (0 = same frame)
    pub relative_depth: usize,
}

/// Stack of lexical frames. The root frame (depth 0) always exists.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    /// Creates a stack holding only an empty root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![ScopeFrame::new()],
        }
    }

    /// Drops every frame and starts over with an empty root.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(ScopeFrame::new());
    }

    /// Current nesting depth (0 = root).
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Begin a new scope.
    pub fn push(&mut self) {
        self.frames.push(ScopeFrame::new());
    }

    /// End the current scope and hand back its frame.
    pub fn pop(&mut self) -> Result<ScopeFrame> {
        if self.frames.len() == 1 {
            return Err(Error::ScopeUnderflow);
        }
        self.frames.pop().ok_or(Error::ScopeUnderflow)
    }

    /// The innermost frame.
    pub fn current(&self) -> &ScopeFrame {
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut ScopeFrame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// The program root frame.
    pub fn root_mut(&mut self) -> &mut ScopeFrame {
        &mut self.frames[0]
    }

    /// Register a label in the current frame and return its address.
    ///
    /// Functions take `pc`, the address their body will start at; every
    /// other kind takes the frame's next data slot.
    pub fn register(
        &mut self,
        name: &str,
        kind: LabelKind,
        extra: Option<FunctionSignature>,
        pc: Address,
    ) -> Result<Address> {
        let frame = self.current_mut();
        if frame.labels.contains_key(name) {
            return Err(Error::Redefinition(name.to_string()));
        }

        let address = if kind.is_function() {
            pc
        } else {
            let slot = frame.next_data;
            frame.next_data += 1;
            slot
        };

        frame.labels.insert(
            name.to_string(),
            Label {
                address,
                kind,
                extra,
            },
        );
        Ok(address)
    }

    /// Resolve a label from the innermost frame outward.
    pub fn find(&self, name: &str) -> Option<Resolved<'_>> {
        self.frames
            .iter()
            .rev()
            .enumerate()
            .find_map(|(relative_depth, frame)| {
                frame.labels.get(name).map(|label| Resolved {
                    label,
                    relative_depth,
                })
            })
    }

    /// Like [`ScopeStack::find`], but absence is an error.
    pub fn lookup(&self, name: &str) -> Result<Resolved<'_>> {
        self.find(name)
            .ok_or_else(|| Error::UnresolvedReference(name.to_string()))
    }

    /// Park a call whose callee is not registered yet on the current frame.
    pub fn defer_call(&mut self, call: PendingCall) {
        self.current_mut().pending.push(call);
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> LabelKind {
        LabelKind::Variable(TypeTag::new("int"))
    }

    #[test]
    fn test_scope_new() {
        let scopes = ScopeStack::new();
        assert_eq!(scopes.depth(), 0);
        assert!(scopes.current().is_empty());
    }

    #[test]
    fn test_scope_push_pop() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert_eq!(scopes.depth(), 1);
        scopes.pop().unwrap();
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let mut scopes = ScopeStack::new();
        assert!(matches!(scopes.pop(), Err(Error::ScopeUnderflow)));
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_variable_slots_are_sequential() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.register("a", int(), None, 40).unwrap(), 0);
        assert_eq!(scopes.register("b", int(), None, 41).unwrap(), 1);
        assert_eq!(scopes.register("c", int(), None, 42).unwrap(), 2);
        assert_eq!(scopes.current().data_slots(), 3);
    }

    #[test]
    fn test_function_takes_pc_and_no_slot() {
        let mut scopes = ScopeStack::new();
        scopes.register("x", int(), None, 0).unwrap();
        let addr = scopes.register("f", LabelKind::Function, None, 17).unwrap();
        assert_eq!(addr, 17);
        assert_eq!(scopes.register("y", int(), None, 20).unwrap(), 1);
    }

    #[test]
    fn test_redefinition_in_same_frame() {
        let mut scopes = ScopeStack::new();
        scopes.register("x", int(), None, 0).unwrap();
        let err = scopes.register("x", LabelKind::Function, None, 0).unwrap_err();
        assert!(matches!(err, Error::Redefinition(name) if name == "x"));
    }

    #[test]
    fn test_shadowing_resolves_innermost() {
        let mut scopes = ScopeStack::new();
        scopes.register("x", int(), None, 0).unwrap();
        scopes.register("y", int(), None, 0).unwrap();
        scopes.push();
        scopes.register("x", LabelKind::Variable("float".into()), None, 0).unwrap();

        let inner = scopes.lookup("x").unwrap();
        assert_eq!(inner.relative_depth, 0);
        assert_eq!(inner.label.kind, LabelKind::Variable("float".into()));

        let outer = scopes.lookup("y").unwrap();
        assert_eq!(outer.relative_depth, 1);
        assert_eq!(outer.label.address, 1);
    }

    #[test]
    fn test_relative_depth_counts_pops() {
        let mut scopes = ScopeStack::new();
        scopes.register("g", int(), None, 0).unwrap();
        scopes.push();
        scopes.push();
        scopes.push();
        assert_eq!(scopes.lookup("g").unwrap().relative_depth, 3);
    }

    #[test]
    fn test_label_dies_with_frame() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.register("tmp", int(), None, 0).unwrap();
        assert!(scopes.find("tmp").is_some());
        scopes.pop().unwrap();
        assert!(scopes.find("tmp").is_none());
        assert!(matches!(
            scopes.lookup("tmp"),
            Err(Error::UnresolvedReference(name)) if name == "tmp"
        ));
    }

    #[test]
    fn test_reset_restores_single_root() {
        let mut scopes = ScopeStack::new();
        scopes.register("x", int(), None, 0).unwrap();
        scopes.push();
        scopes.reset();
        assert_eq!(scopes.depth(), 0);
        assert!(scopes.find("x").is_none());
    }

    #[test]
    fn test_deferred_calls_belong_to_current_frame() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.defer_call(PendingCall {
            name: "later".into(),
            patch_at: 3,
        });
        let mut frame = scopes.pop().unwrap();
        assert_eq!(frame.take_pending().len(), 1);
        assert!(frame.take_pending().is_empty());
    }
}
