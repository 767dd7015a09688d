//! # Language Module
//!
//! Language independent pieces used by the dialect analyzers: the error type, the `Document`
//! that converts between byte offsets and LSP positions, and small helpers for ranges and
//! JSON settings.  The rcasm analysis itself is in the `rcasm` submodule.

pub mod rcasm;

use lsp_types as lsp;
use thiserror::Error;

/// Returned by a tree visitor to steer the walk
pub enum WalkerChoice {
    GotoChild,
    GotoSibling,
    GotoParentSibling,
    Exit
}

#[derive(Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Invalid number")]
    BadNumber,
    #[error("Unknown directive")]
    UnknownDirective,
    #[error("Unbalanced block")]
    UnbalancedBlock
}

/// Source document with its identity.
/// Offsets are byte offsets into `text`, positions use UTF-16 character counts as LSP expects.
#[derive(Clone,Debug)]
pub struct Document {
    pub uri: lsp::Uri,
    pub version: Option<i32>,
    text: String,
    line_starts: Vec<usize>
}

impl Document {
    pub fn new(uri: lsp::Uri, text: String, version: Option<i32>) -> Self {
        let mut line_starts = vec![0];
        for (i,c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            uri,
            version,
            text,
            line_starts
        }
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    /// Text of the given row without the line terminator
    pub fn line(&self,row: usize) -> Option<&str> {
        let start = *self.line_starts.get(row)?;
        let end = match self.line_starts.get(row + 1) {
            Some(next) => *next,
            None => self.text.len()
        };
        let ans = &self.text[start..end];
        Some(ans.trim_end_matches('\n').trim_end_matches('\r'))
    }
    pub fn position_at(&self,offset: usize) -> lsp::Position {
        let offset = usize::min(offset,self.text.len());
        let row = self.line_starts.partition_point(|s| *s <= offset) - 1;
        let start = self.line_starts[row];
        let character = match self.text.get(start..offset) {
            Some(s) => s.encode_utf16().count(),
            None => offset - start
        };
        lsp::Position::new(row as u32,character as u32)
    }
    pub fn offset_at(&self,pos: &lsp::Position) -> usize {
        let row = pos.line as usize;
        if row >= self.line_starts.len() {
            return self.text.len();
        }
        let start = self.line_starts[row];
        let line = match self.line(row) {
            Some(l) => l,
            None => return start
        };
        let mut units = 0;
        for (i,c) in line.char_indices() {
            if units >= pos.character as usize {
                return start + i;
            }
            units += c.len_utf16();
        }
        start + line.len()
    }
    pub fn range_of(&self,start: usize,end: usize) -> lsp::Range {
        lsp::Range::new(self.position_at(start),self.position_at(end))
    }
}

/// Both ends of the range are included
pub fn range_contains_pos(rng: &lsp::Range,pos: &lsp::Position) -> bool {
    if pos.line < rng.start.line || pos.line > rng.end.line {
        return false;
    }
    if pos.line == rng.start.line && pos.character < rng.start.character {
        return false;
    }
    if pos.line == rng.end.line && pos.character > rng.end.character {
        return false;
    }
    true
}

/// Try to update a boolean from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_bool(maybe_obj: &serde_json::Value, key: &str, curr: &mut bool) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(b) = x.as_bool() {
                *curr = b;
            }
        }
    }
}

/// Try to update a string from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_string(maybe_obj: &serde_json::Value, key: &str, curr: &mut String) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(s) = x.as_str() {
                *curr = s.to_string();
            }
        }
    }
}

/// Try to update a list of strings from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_vec_str(maybe_obj: &serde_json::Value, key: &str, curr: &mut Vec<String>) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            if let Some(a) = x.as_array() {
                let mut ans = Vec::new();
                for v in a {
                    match v.as_str() {
                        Some(s) => ans.push(s.to_string()),
                        None => return
                    }
                }
                *curr = ans;
            }
        }
    }
}
