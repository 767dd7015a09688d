//! # `rcasm-analyzer` library
//!
//! This library is the analysis core of a language server for the rcasm assembly dialect.
//! It turns raw source text into a navigable program model and answers the structural
//! queries that editor features are built from.
//!
//! ## Architecture
//!
//! Analysis is built around three pieces that are rebuilt from scratch whenever a document changes:
//! * `lang::rcasm::nodes::Tree` is a position-addressable, parent-linked tree adapted from the parser's AST
//! * `lang::rcasm::scopes::Scopes` is the tree of nested lexical scopes built in the same pass
//! * `lang::rcasm::symbols::Symbols` is the flat table of qualified definitions and references
//!
//! The tree and scopes come out of `lang::rcasm::adapter::parse`, the symbol table out of
//! `lang::rcasm::symbols::process_symbols`.  A `lang::rcasm::checkpoint::DocumentStore` keeps
//! the bundle for each open document and answers editor requests.
//!
//! ## Partial Lines
//!
//! While the user is typing, the line under the cursor usually does not parse.
//! `lang::rcasm::tokenizer` classifies a single line into label, mnemonic, operands and comment
//! without requiring it to be valid, which is what completions work from.

pub mod lang;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;
