use std::str::FromStr;
use lsp_types as lsp;
use crate::lang::Document;

mod parser_test;
mod tokenizer_test;

const TEST_URI: &str = "file:///example.rcasm";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_uri() -> lsp::Uri {
    lsp::Uri::from_str(TEST_URI).expect("bad uri")
}

/// document from lines of code joined by newlines
fn test_doc(code: &[&str]) -> Document {
    init_logger();
    Document::new(test_uri(),code.join("\n"),Some(0))
}

fn range(l1: u32,c1: u32,l2: u32,c2: u32) -> lsp::Range {
    lsp::Range::new(lsp::Position::new(l1,c1),lsp::Position::new(l2,c2))
}
