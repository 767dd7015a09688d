//! Completion provider
//!
//! Works on the line being typed, which is usually not parseable, so the line is classified
//! by the tokenizer rather than the parser.

use lsp_types as lsp;
use super::checkpoint::ProcessedDocument;
use super::settings::Settings;
use super::tokenizer::{self,Component,ComponentType};
use super::{handbook,MnemonicKind,DATA_REGISTERS,ADDRESS_REGISTERS,NAMED_REGISTERS};

pub struct CompletionProvider {
    config: Settings
}

fn register_detail(reg: &str) -> &'static str {
    match reg {
        "pc" => "Program Counter",
        "as" => "Address Switches",
        "ds" => "Data Switches",
        _ => "(register)"
    }
}

/// Registers accepted by an operand placeholder from the handbook syntax
fn registers_for(placeholder: &str) -> Vec<&'static str> {
    match placeholder {
        "<label>" | "<message>" => Vec::new(),
        "<src:Dr>" | "<dst:Dr>" => DATA_REGISTERS.to_vec(),
        "<dst:a|b>" => vec!["a","b"],
        "<dst:a|d>" => vec!["a","d"],
        "<src:a-d>" | "<dst:a-d>" => vec!["a","b","c","d"],
        _ => [DATA_REGISTERS.as_slice(),ADDRESS_REGISTERS.as_slice(),NAMED_REGISTERS.as_slice()].concat()
    }
}

impl CompletionProvider {
    pub fn new() -> Self {
        Self {
            config: Settings::new()
        }
    }
    pub fn set_config(&mut self,config: Settings) {
        self.config = config;
    }
    /// Upper case if the typed text has upper case, without typed letters the configuration decides
    fn is_upper(&self,typed: &str) -> bool {
        match typed.chars().any(|c| c.is_alphabetic()) {
            true => typed.to_lowercase() != typed,
            false => !self.config.completions.lower_case
        }
    }
    fn add_mnemonics(&self,ans: &mut Vec<lsp::CompletionItem>,upper: bool,rng: Option<lsp::Range>) {
        for doc in handbook::mnemonics(self.config.processor) {
            let (kind,sort_text) = match doc.kind {
                MnemonicKind::Instruction => (lsp::CompletionItemKind::METHOD,None),
                MnemonicKind::Directive => (lsp::CompletionItemKind::KEYWORD,Some(doc.title[1..].to_string()))
            };
            let insert = doc.snippet.clone().unwrap_or(doc.title.clone());
            let (label,insert) = match upper {
                true => (doc.title.to_uppercase(),insert.to_uppercase()),
                false => (doc.title.to_lowercase(),insert)
            };
            let insert_text_format = match doc.snippet {
                Some(_) => lsp::InsertTextFormat::SNIPPET,
                None => lsp::InsertTextFormat::PLAIN_TEXT
            };
            ans.push(lsp::CompletionItem {
                label,
                label_details: Some(lsp::CompletionItemLabelDetails {
                    detail: None,
                    description: Some(doc.brief.clone())
                }),
                kind: Some(kind),
                documentation: Some(lsp::Documentation::MarkupContent(lsp::MarkupContent {
                    kind: lsp::MarkupKind::Markdown,
                    value: doc.markdown()
                })),
                sort_text,
                insert_text: Some(insert.clone()),
                insert_text_format: Some(insert_text_format),
                // replace what was typed, e.g. a lone `!`, rather than insert after it
                text_edit: rng.map(|r| lsp::CompletionTextEdit::Edit(lsp::TextEdit::new(r,insert))),
                ..Default::default()
            });
        }
    }
    fn add_registers(&self,ans: &mut Vec<lsp::CompletionItem>,placeholder: &str,upper: bool) {
        for reg in registers_for(placeholder) {
            ans.push(lsp::CompletionItem {
                label: match upper {
                    true => reg.to_uppercase(),
                    false => reg.to_string()
                },
                kind: Some(lsp::CompletionItemKind::KEYWORD),
                detail: Some(register_detail(reg).to_string()),
                ..Default::default()
            });
        }
    }
    /// Completions at the position, only the text of the row up to the cursor is considered
    pub fn get(&self,processed: &ProcessedDocument,pos: &lsp::Position) -> Vec<lsp::CompletionItem> {
        let mut ans = Vec::new();
        let doc = &processed.doc;
        let line_start = doc.offset_at(&lsp::Position::new(pos.line,0));
        let line = match doc.line(pos.line as usize) {
            Some(l) => l,
            None => return ans
        };
        let col = usize::min(doc.offset_at(pos) - line_start,line.len());
        if col == 0 {
            return ans;
        }
        let tokens = tokenizer::parse_line(&line[..col]);
        let info = tokenizer::component_at_index(&tokens,col);
        let typed = info.as_ref().map(|i| i.component.value.clone()).unwrap_or_default();
        let upper = self.is_upper(&typed);
        let typ = match &info {
            Some(i) => Some(i.typ),
            None => match &tokens.mnemonic {
                Some(m) if col > m.end && tokens.comment.is_none() && tokens.operands.is_none() => Some(ComponentType::Operand),
                Some(_) => None,
                None => Some(ComponentType::Mnemonic)
            }
        };
        log::trace!("completing {:?} `{}`",typ,typed);
        match typ {
            Some(ComponentType::Mnemonic) => {
                let rng = info.map(|i| {
                    let c: Component = i.component;
                    doc.range_of(line_start + c.start,line_start + c.end)
                });
                self.add_mnemonics(&mut ans,upper,rng);
            },
            Some(ComponentType::Operand) => {
                let mnemonic = match &tokens.mnemonic {
                    Some(m) => m.value.to_lowercase(),
                    None => return ans
                };
                if handbook::operand_count(&mnemonic)==Some(0) {
                    return ans;
                }
                let index = info.and_then(|i| i.index).unwrap_or(0);
                let placeholder = handbook::operand_placeholder(&mnemonic,index).unwrap_or_default();
                self.add_registers(&mut ans,&placeholder,upper);
            },
            _ => {}
        }
        ans
    }
}
