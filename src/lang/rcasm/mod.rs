//! # rcasm analysis
//!
//! This module is the analysis core used by the rcasm language server.
//! The source is parsed by `parser::RcasmParser` into the AST of `ast`, which the
//! `adapter` converts into the node tree of `nodes` while building the scope tree of `scopes`.
//! The `symbols` module then produces qualified definitions and references.
//!
//! Lines that are being edited usually do not parse, so `tokenizer` offers an independent,
//! regex driven classification of a single line, which `completions` builds on.
//!
//! Qualified names use `::` between scope names.  The root scope has an empty name, so a top
//! level symbol is known by its bare name, e.g., `start`, while a symbol in a named block is
//! known as, e.g., `scp::start`.  Unlabeled loop bodies and conditional branches get scopes
//! named `__anon_scope_<n>`, labeled loop bodies get `<label>__n`.

use std::fmt;

pub mod ast;
pub mod parser;
pub mod nodes;
pub mod scopes;
pub mod adapter;
pub mod symbols;
pub mod tokenizer;
pub mod handbook;
pub mod settings;
pub mod checkpoint;
pub mod completions;
pub mod hovers;

#[cfg(test)]
mod tests;

const RCH: &str = "unreachable was reached";

/// registers that hold data
pub const DATA_REGISTERS: [&str;8] = ["a","b","c","d","m1","m2","x","y"];
/// registers that hold addresses
pub const ADDRESS_REGISTERS: [&str;3] = ["m","xy","j"];
/// registers with special functions
pub const NAMED_REGISTERS: [&str;3] = ["pc","as","ds"];

#[derive(Clone,Copy,PartialEq,Debug)]
pub enum Processor {
    Rcasm,
    RcasmDiv
}

#[derive(Clone,Copy,PartialEq,Debug)]
pub enum MnemonicKind {
    Instruction,
    Directive
}

/// Handbook entry for an instruction or directive
#[derive(Clone,Debug)]
pub struct MnemonicDoc {
    pub title: String,
    pub kind: MnemonicKind,
    pub brief: String,
    pub desc: String,
    /// syntax strings such as `mov <dst:Dr>,<src:Dr>`, the first is the primary form
    pub syntax: Vec<String>,
    /// snippet inserted by completions, if any
    pub snippet: Option<String>,
    pub processors: Vec<Processor>
}

impl MnemonicDoc {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            kind: MnemonicKind::Instruction,
            brief: String::new(),
            desc: String::new(),
            syntax: Vec::new(),
            snippet: None,
            processors: Vec::new()
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rcasm => write!(f,"rcasm"),
            Self::RcasmDiv => write!(f,"rcasm+div")
        }
    }
}

/// True if the text names a register, case insensitive
pub fn is_register(txt: &str) -> bool {
    let lower = txt.to_lowercase();
    DATA_REGISTERS.contains(&lower.as_str()) ||
        ADDRESS_REGISTERS.contains(&lower.as_str()) ||
        NAMED_REGISTERS.contains(&lower.as_str())
}
