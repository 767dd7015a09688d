//! Instruction and directive handbook
//!
//! This is used throughout to decide what a mnemonic expects, and to document it.
//! Keys are lower case, directives keep their `!`.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use super::{MnemonicDoc,MnemonicKind,Processor,DATA_REGISTERS,ADDRESS_REGISTERS};
use super::tokenizer::parse_signature;
use super::RCH;
use crate::lang::{update_json_string, update_json_vec_str};

const JSON_STR: &str = include_str!("mnemonics.json");

static HANDBOOK: Lazy<HashMap<String,MnemonicDoc>> = Lazy::new(build_handbook);

/// Try to update a processor list from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_procs(maybe_obj: &serde_json::Value, key: &str, curr: &mut Vec<Processor>) {
    if let Some(outer) = maybe_obj.as_object() {
        if let Some(x) = outer.get(key) {
            let mut ans: Vec<Processor> = Vec::new();
            if let Some(a) = x.as_array() {
                for v in a {
                    match v.as_str().and_then(parse_processor) {
                        Some(p) => ans.push(p),
                        None => return
                    }
                }
                *curr = ans;
            }
        }
    }
}

pub fn parse_processor(s: &str) -> Option<Processor> {
    match s {
        "rcasm" => Some(Processor::Rcasm),
        "rcasm+div" => Some(Processor::RcasmDiv),
        _ => None
    }
}

/// This can panic if something is wrong with the JSON.
/// But the JSON practically never changes.
fn build_handbook() -> HashMap<String,MnemonicDoc> {
    let mut ans = HashMap::new();
    let root_val = serde_json::from_str::<serde_json::Value>(JSON_STR).expect(RCH);
    if let Some(root) = root_val.as_object() {
        for (mnemonic,info) in root {
            let mut doc = MnemonicDoc::new();
            doc.title = mnemonic.to_string();
            let mut kind = String::new();
            update_json_string(info,"kind",&mut kind);
            if kind == "directive" {
                doc.kind = MnemonicKind::Directive;
            }
            update_json_string(info,"brief",&mut doc.brief);
            update_json_string(info,"desc",&mut doc.desc);
            update_json_vec_str(info,"syntax",&mut doc.syntax);
            let mut snippet = String::new();
            update_json_string(info,"snippet",&mut snippet);
            if snippet.len() > 0 {
                doc.snippet = Some(snippet);
            }
            update_json_procs(info,"procs",&mut doc.processors);
            ans.insert(mnemonic.to_lowercase(),doc);
        }
    }
    ans
}

/// Case insensitive lookup
pub fn lookup(mnemonic: &str) -> Option<&'static MnemonicDoc> {
    HANDBOOK.get(&mnemonic.to_lowercase())
}

/// All entries supported by the processor, sorted by title
pub fn mnemonics(proc: Processor) -> Vec<&'static MnemonicDoc> {
    let mut ans: Vec<&MnemonicDoc> = HANDBOOK.values().filter(|d| d.processors.contains(&proc)).collect();
    ans.sort_by(|a,b| a.title.cmp(&b.title));
    ans
}

/// Number of operands in the primary syntax, optional ones included, or `None` if unknown
pub fn operand_count(mnemonic: &str) -> Option<usize> {
    let doc = lookup(mnemonic)?;
    let syntax = doc.syntax.first()?;
    Some(parse_signature(syntax).operands.map(|ops| ops.len()).unwrap_or(0))
}

/// Placeholder expected at operand `index` by the primary syntax, e.g. `<dst:a-d>`
pub fn operand_placeholder(mnemonic: &str,index: usize) -> Option<String> {
    let doc = lookup(mnemonic)?;
    let syntax = doc.syntax.first()?;
    let ops = parse_signature(syntax).operands?;
    ops.get(index).map(|c| c.value.clone())
}

/// Markdown for a register hover, `None` if the text is not a register
pub fn register_markdown(reg: &str) -> Option<String> {
    let lower = reg.to_lowercase();
    let brief = match lower.as_str() {
        "pc" => "Program Counter".to_string(),
        "as" => "Address Switches".to_string(),
        "ds" => "Data Switches".to_string(),
        r if DATA_REGISTERS.contains(&r) || ADDRESS_REGISTERS.contains(&r) => format!("{} Register",r.to_uppercase()),
        _ => return None
    };
    let width = match ADDRESS_REGISTERS.contains(&lower.as_str()) || lower=="pc" || lower=="as" {
        true => 16,
        false => 8
    };
    Some(format!("**{}**  \n{}-bit register",brief,width))
}

impl MnemonicDoc {
    /// Markdown for hovers: syntax block, then the brief and description
    pub fn markdown(&self) -> String {
        let mut ans = String::from("```rcasm\n");
        ans += &self.syntax.join("\n");
        ans += "\n```\n\n---\n\n";
        ans += &format!("**{}**",self.brief);
        if !self.desc.is_empty() {
            ans += "  \n";
            ans += &self.desc;
        }
        if self.processors.len() == 1 {
            ans += &format!("\n\n_{} only_",self.processors[0]);
        }
        ans
    }
}
