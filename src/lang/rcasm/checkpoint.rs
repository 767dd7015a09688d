//! rcasm checkpoint module.
//!
//! Keeps the analysis of every open document and answers editor requests from it.
//! Each document's bundle is rebuilt from scratch when its text changes and swapped in whole.

use std::collections::HashMap;
use std::sync::Arc;
use lsp_types as lsp;
use crate::lang::{Document,WalkerChoice};
use crate::STDRESULT;
use super::adapter::{self,ParsedProgram};
use super::completions::CompletionProvider;
use super::hovers::HoverProvider;
use super::nodes::{NodeKind,TreeCursor,Visit};
use super::settings::{self,Settings};
use super::symbols::{self,DefinitionType,SymbolHit,Symbols};

/// Everything known about one version of a document
pub struct ProcessedDocument {
    pub doc: Document,
    pub program: ParsedProgram,
    pub symbols: Symbols
}

pub struct DocumentStore {
    config: Settings,
    docs: HashMap<lsp::Uri,Arc<ProcessedDocument>>,
    hovers: HoverProvider,
    completions: CompletionProvider
}

#[allow(deprecated)]
fn create_symbol(name: String,detail: Option<String>,kind: lsp::SymbolKind,rng: &lsp::Range,sel: &lsp::Range) -> lsp::DocumentSymbol {
    lsp::DocumentSymbol {
        name,
        detail,
        kind,
        range: rng.clone(),
        selection_range: sel.clone(),
        tags: None,
        children: None,
        deprecated: None
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c=='_' => chars.all(|c| c.is_alphanumeric() || c=='_'),
        _ => false
    }
}

/// Gathers fold ranges for named scopes and block directives
struct FoldingVisitor<'a> {
    doc: &'a Document,
    folds: Vec<lsp::FoldingRange>
}

impl Visit for FoldingVisitor<'_> {
    fn visit(&mut self,curs: &TreeCursor) -> WalkerChoice {
        let node = curs.node();
        let foldable = match node.kind {
            NodeKind::Instruction => return WalkerChoice::GotoSibling,
            NodeKind::Scope => true,
            NodeKind::Directive => matches!(node.text(),Some("!for") | Some("!if")),
            _ => false
        };
        if foldable {
            let rng = self.doc.range_of(node.offset,node.end());
            self.folds.push(lsp::FoldingRange {
                start_line: rng.start.line,
                start_character: None,
                end_line: rng.end.line,
                end_character: None,
                kind: Some(lsp::FoldingRangeKind::Region),
                collapsed_text: None
            });
        }
        WalkerChoice::GotoChild
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            config: Settings::new(),
            docs: HashMap::new(),
            hovers: HoverProvider::new(),
            completions: CompletionProvider::new()
        }
    }
    pub fn config(&self) -> &Settings {
        &self.config
    }
    /// Apply client settings, open documents are processed again with the new settings
    pub fn update_config(&mut self,json: &str) -> STDRESULT {
        self.config = settings::parse(json)?;
        self.hovers.set_config(self.config.clone());
        self.completions.set_config(self.config.clone());
        let docs: Vec<Document> = self.docs.values().map(|p| p.doc.clone()).collect();
        for doc in docs {
            self.process(doc);
        }
        Ok(())
    }
    /// Analyze the document and replace whatever was stored for its URI
    pub fn process(&mut self,doc: Document) -> Arc<ProcessedDocument> {
        log::debug!("processing {} version {:?}",doc.uri.as_str(),doc.version);
        let program = adapter::parse(doc.text());
        let symbols = symbols::process_symbols(&doc,&program,self.config.symbols.comments);
        let ans = Arc::new(ProcessedDocument { doc, program, symbols });
        self.docs.insert(ans.doc.uri.clone(),Arc::clone(&ans));
        ans
    }
    pub fn get(&self,uri: &lsp::Uri) -> Option<Arc<ProcessedDocument>> {
        self.docs.get(uri).map(Arc::clone)
    }
    pub fn remove(&mut self,uri: &lsp::Uri) {
        self.docs.remove(uri);
    }
    pub fn get_definitions(&self,uri: &lsp::Uri,pos: &lsp::Position) -> Vec<lsp::Location> {
        match self.docs.get(uri) {
            Some(p) => p.symbols.get_definitions(pos).iter().map(|d| d.location.clone()).collect(),
            None => Vec::new()
        }
    }
    pub fn get_references(&self,uri: &lsp::Uri,pos: &lsp::Position,include_declaration: bool) -> Vec<lsp::Location> {
        match self.docs.get(uri) {
            Some(p) => p.symbols.get_references(pos,include_declaration),
            None => Vec::new()
        }
    }
    /// Range that a rename at this position would replace
    pub fn prepare_rename(&self,uri: &lsp::Uri,pos: &lsp::Position) -> Option<lsp::Range> {
        let p = self.docs.get(uri)?;
        match p.symbols.symbol_at_position(pos)? {
            SymbolHit::Definition(d) => Some(d.selection_range),
            SymbolHit::Reference(r) => Some(r.selection_range)
        }
    }
    /// Rename the symbol at the position.  Only the last segment of a qualified reference is replaced.
    pub fn rename(&self,uri: &lsp::Uri,pos: &lsp::Position,new_name: &str) -> Option<lsp::WorkspaceEdit> {
        if !is_identifier(new_name) {
            log::debug!("refusing to rename to `{}`",new_name);
            return None;
        }
        let p = self.docs.get(uri)?;
        let name = p.symbols.symbol_at_position(pos)?.name().to_string();
        let mut edits = Vec::new();
        if let Some(def) = p.symbols.definitions.get(&name) {
            edits.push(lsp::TextEdit::new(def.selection_range,new_name.to_string()));
        }
        if let Some(refs) = p.symbols.references.get(&name) {
            for r in refs {
                edits.push(lsp::TextEdit::new(r.selection_range,new_name.to_string()));
            }
        }
        let mut changes = HashMap::new();
        changes.insert(uri.clone(),edits);
        Some(lsp::WorkspaceEdit::new(changes))
    }
    /// References are read, the definition is written
    pub fn get_highlights(&self,uri: &lsp::Uri,pos: &lsp::Position) -> Vec<lsp::DocumentHighlight> {
        let mut ans = Vec::new();
        let p = match self.docs.get(uri) {
            Some(p) => p,
            None => return ans
        };
        let name = match p.symbols.symbol_at_position(pos) {
            Some(hit) => hit.name().to_string(),
            None => return ans
        };
        if let Some(refs) = p.symbols.references.get(&name) {
            for r in refs {
                ans.push(lsp::DocumentHighlight { range: r.location.range, kind: Some(lsp::DocumentHighlightKind::READ) });
            }
        }
        if let Some(def) = p.symbols.definitions.get(&name) {
            ans.push(lsp::DocumentHighlight { range: def.selection_range, kind: Some(lsp::DocumentHighlightKind::WRITE) });
        }
        ans
    }
    /// Outline of the document, definitions in document order
    pub fn get_symbols(&self,uri: &lsp::Uri) -> Vec<lsp::DocumentSymbol> {
        let p = match self.docs.get(uri) {
            Some(p) => p,
            None => return Vec::new()
        };
        let mut defs: Vec<_> = p.symbols.definitions.values().collect();
        defs.sort_by_key(|d| (d.selection_range.start.line,d.selection_range.start.character,d.name.clone()));
        defs.iter().map(|d| {
            let (kind,detail) = match d.typ {
                DefinitionType::Label => (lsp::SymbolKind::FIELD,"label"),
                DefinitionType::Variable => (lsp::SymbolKind::VARIABLE,"variable")
            };
            create_symbol(d.name.clone(),Some(detail.to_string()),kind,&d.location.range,&d.selection_range)
        }).collect()
    }
    /// Folds for scopes, `!for` and `!if`, sorted, with partially overlapping folds removed
    pub fn get_folding_ranges(&self,uri: &lsp::Uri) -> Vec<lsp::FoldingRange> {
        let p = match self.docs.get(uri) {
            Some(p) => p,
            None => return Vec::new()
        };
        let mut visitor = FoldingVisitor { doc: &p.doc, folds: Vec::new() };
        visitor.walk(&p.program.tree);
        let mut folds = visitor.folds;
        folds.sort_by_key(|f| (f.start_line,f.end_line));
        let mut ans: Vec<lsp::FoldingRange> = Vec::new();
        let mut prev_end: Option<u32> = None;
        for f in folds {
            if let Some(pe) = prev_end {
                if f.start_line < pe && pe < f.end_line {
                    continue;
                }
            }
            prev_end = Some(f.end_line);
            ans.push(f);
        }
        ans
    }
    pub fn get_hover(&mut self,uri: &lsp::Uri,pos: &lsp::Position) -> Option<lsp::Hover> {
        let p = self.docs.get(uri)?;
        self.hovers.get(p,pos)
    }
    pub fn get_completions(&self,uri: &lsp::Uri,pos: &lsp::Position) -> Vec<lsp::CompletionItem> {
        match self.docs.get(uri) {
            Some(p) => self.completions.get(p,pos),
            None => Vec::new()
        }
    }
}
