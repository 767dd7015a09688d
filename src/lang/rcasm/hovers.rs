//! Hover provider
//!
//! The node path at the cursor is searched from the innermost node outward until something
//! can be shown: a symbol, a literal value, a register, or a handbook entry.

use lsp_types as lsp;
use crate::lang::Document;
use super::checkpoint::ProcessedDocument;
use super::handbook;
use super::nodes::{Node,NodeKind,NodeValue};
use super::settings::Settings;
use super::symbols::{Definition,DefinitionType,SymbolHit};

pub struct HoverProvider {
    config: Settings,
    markup: lsp::MarkupContent,
    rng: lsp::Range
}

fn new_section(hov: &mut String, sec: &str) {
    if hov.len() > 0 && sec.len() > 0 {
        *hov += "\n\n---\n\n"
    }
    *hov += sec;
}

/// Declaring line without its comment and with whitespace collapsed
fn format_declaration(doc: &Document,row: u32) -> String {
    let line = doc.line(row as usize).unwrap_or_default();
    let code = match line.find(';') {
        Some(i) => &line[..i],
        None => line
    };
    code.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn format_number(n: i64) -> String {
    format!("{} | {:#x} | {:b}b",n,n,n)
}

impl HoverProvider {
    pub fn new() -> Self {
        let zero = lsp::Position::new(0,0);
        Self {
            config: Settings::new(),
            markup: lsp::MarkupContent {
                kind: lsp::MarkupKind::Markdown,
                value: "".to_string()
            },
            rng: lsp::Range::new(zero,zero)
        }
    }
    pub fn set_config(&mut self,config: Settings) {
        self.config = config;
    }
    fn handle_definition(&mut self,doc: &Document,def: &Definition) {
        match def.typ {
            DefinitionType::Label => new_section(&mut self.markup.value,&format!("(label) {}",def.name)),
            DefinitionType::Variable => {
                let code = format_declaration(doc,def.location.range.start.line);
                new_section(&mut self.markup.value,&["```rcasm\n",&code,"\n```"].concat());
            }
        }
        if let Some(comment) = &def.comment {
            new_section(&mut self.markup.value,comment);
        }
    }
    /// Hover for the symbol at the position, a reference without a definition shows its assumed name
    fn handle_symbol(&mut self,processed: &ProcessedDocument,pos: &lsp::Position) -> bool {
        let symbols = &processed.symbols;
        let name = match symbols.symbol_at_position(pos) {
            Some(SymbolHit::Definition(d)) => d.name.clone(),
            Some(SymbolHit::Reference(r)) => r.name.clone(),
            None => return false
        };
        match symbols.definitions.get(&name) {
            Some(def) => self.handle_definition(&processed.doc,def),
            None => new_section(&mut self.markup.value,&format!("(undefined) {}",name))
        }
        true
    }
    fn handle_mnemonic(&mut self,node: &Node,fallback: &str) {
        let mnemonic = match node.kind {
            NodeKind::SetPc => "org",
            _ => node.text().unwrap_or_default()
        };
        match handbook::lookup(mnemonic) {
            Some(doc) => new_section(&mut self.markup.value,&doc.markdown()),
            None => new_section(&mut self.markup.value,&format!("({}) {}",fallback,mnemonic))
        }
    }
    /// Hover at the position, nodes are tried from the innermost outward
    pub fn get(&mut self,processed: &ProcessedDocument,pos: &lsp::Position) -> Option<lsp::Hover> {
        self.markup.value = String::new();
        let doc = &processed.doc;
        let tree = &processed.program.tree;
        let offset = doc.offset_at(pos);
        for id in tree.node_path(offset).iter().rev() {
            let node = tree.get(*id);
            self.rng = doc.range_of(node.offset,node.end());
            match node.kind {
                NodeKind::SqRef | NodeKind::Label | NodeKind::Variable => {
                    if !self.config.hovers.symbols {
                        return None;
                    }
                    if self.handle_symbol(processed,pos) {
                        break;
                    }
                },
                NodeKind::Literal => {
                    match &node.value {
                        Some(NodeValue::Number(n)) => new_section(&mut self.markup.value,&format_number(*n)),
                        Some(NodeValue::Text(s)) => new_section(&mut self.markup.value,s),
                        None => {}
                    }
                    break;
                },
                NodeKind::Register => {
                    if !self.config.hovers.mnemonics {
                        return None;
                    }
                    if let Some(md) = handbook::register_markdown(node.text().unwrap_or_default()) {
                        new_section(&mut self.markup.value,&md);
                    }
                    break;
                },
                NodeKind::Instruction | NodeKind::SetPc => {
                    if !self.config.hovers.mnemonics {
                        return None;
                    }
                    self.handle_mnemonic(node,"instruction");
                    break;
                },
                NodeKind::Directive => {
                    if !self.config.hovers.mnemonics {
                        return None;
                    }
                    self.handle_mnemonic(node,"directive");
                    break;
                },
                _ => {}
            }
        }
        if self.markup.value.len() > 0 {
            return Some(lsp::Hover {
                contents: lsp::HoverContents::Markup(self.markup.clone()),
                range: Some(self.rng)
            });
        }
        None
    }
}
