//! # Symbol table
//!
//! Flattens the scope tree into definitions keyed by fully qualified name, and gathers
//! every scope qualified reference in the node tree under the name it targets.

use std::collections::HashMap;
use lsp_types as lsp;
use once_cell::sync::Lazy;
use regex::Regex;
use super::adapter::ParsedProgram;
use super::nodes::{Node,NodeKind};
use super::scopes::{Resolution,ScopeId,Scopes,SymEntry};
use super::tokenizer::parse_line;
use super::RCH;
use crate::lang::{Document,range_contains_pos};

static LOOP_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"__\d+$").expect(RCH));
static COMMENT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[;*]\s?").expect(RCH));
static RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*=_~#+]{3,}\s*$").expect(RCH));
static MD_SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([*_{}\[\]()#+\-.!`])").expect(RCH));
const RULE_PLACEHOLDER: &str = "~~~";
const HORIZONTAL_RULE: &str = "***";

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum DefinitionType {
    Label,
    Variable
}

#[derive(Clone,Debug,PartialEq)]
pub struct Definition {
    /// fully qualified name
    pub name: String,
    pub typ: DefinitionType,
    pub location: lsp::Location,
    pub selection_range: lsp::Range,
    /// markdown built from the comment lines attached to the definition
    pub comment: Option<String>
}

/// A reference to a name
#[derive(Clone,Debug,PartialEq)]
pub struct NamedSymbol {
    /// fully qualified name of the target
    pub name: String,
    /// the whole qualified reference
    pub location: lsp::Location,
    /// the last segment of the reference
    pub selection_range: lsp::Range
}

#[derive(Clone,Debug,PartialEq)]
pub enum SymbolHit<'a> {
    Definition(&'a Definition),
    Reference(&'a NamedSymbol)
}

impl SymbolHit<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Definition(d) => &d.name,
            Self::Reference(r) => &r.name
        }
    }
}

#[derive(Clone,Debug,PartialEq,Default)]
pub struct Symbols {
    pub definitions: HashMap<String,Definition>,
    /// references in document order, keyed by target name
    pub references: HashMap<String,Vec<NamedSymbol>>
}

/// Replace the iteration suffix of a loop body scope, `lp__4` becomes `lp__n`
pub fn normalize_segment(seg: &str) -> String {
    LOOP_SUFFIX.replace(seg,"__n").to_string()
}

/// Turn raw comment lines into markdown lines joined by hard breaks
fn demarkdown(comment_lines: &[String]) -> Option<String> {
    let mut processed: Vec<String> = comment_lines.iter().map(|l| {
        let l = COMMENT_MARK.replace(l,"").to_string();
        let l = RULE_LINE.replace(&l,RULE_PLACEHOLDER).to_string();
        let l = MD_SPECIAL.replace_all(&l,"\\${1}").to_string();
        match l==RULE_PLACEHOLDER {
            true => HORIZONTAL_RULE.to_string(),
            false => l
        }
    }).collect();
    while processed.first().is_some_and(|l| l==HORIZONTAL_RULE) {
        processed.remove(0);
    }
    while processed.last().is_some_and(|l| l==HORIZONTAL_RULE) {
        processed.pop();
    }
    match processed.len() {
        0 => None,
        _ => Some(processed.join("  \n"))
    }
}

/// The `;` comment on the row itself, or else the run of comment-only rows directly above it
fn comment_lines(doc: &Document,row: usize) -> Vec<String> {
    let mut ans = Vec::new();
    if let Some(txt) = doc.line(row) {
        // a comment by position, e.g. the `= 5` of `!let k = 5`, does not stop the search
        if let Some(c) = parse_line(txt).comment.filter(|c| c.value.starts_with(';')) {
            ans.push(c.value);
            return ans;
        }
    }
    for i in (0..row).rev() {
        let tokens = match doc.line(i) {
            Some(txt) => parse_line(txt),
            None => break
        };
        match (&tokens.label,&tokens.mnemonic,tokens.comment) {
            (None,None,Some(c)) if c.value.trim().starts_with(';') => ans.insert(0,c.value),
            _ => break
        }
    }
    ans
}

fn node_range(doc: &Document,node: &Node) -> lsp::Range {
    doc.range_of(node.offset,node.end())
}

struct SymbolCollector<'a> {
    doc: &'a Document,
    program: &'a ParsedProgram,
    with_comments: bool,
    symbols: Symbols
}

impl SymbolCollector<'_> {
    fn add_definition(&mut self,entry: &SymEntry,prefix: &str) {
        let name = [prefix,entry.name()].concat();
        if self.symbols.definitions.contains_key(&name) {
            return;
        }
        let typ = match entry {
            SymEntry::Label { .. } => DefinitionType::Label,
            SymEntry::Var { .. } => DefinitionType::Variable
        };
        let range = node_range(self.doc,self.program.tree.get(entry.node()));
        let comment = match self.with_comments {
            true => demarkdown(&comment_lines(self.doc,range.start.line as usize)),
            false => None
        };
        log::trace!("definition {}",name);
        self.symbols.definitions.insert(name.clone(),Definition {
            name,
            typ,
            location: lsp::Location::new(self.doc.uri.clone(),range),
            selection_range: range,
            comment
        });
    }
    fn walk_scope(&mut self,id: ScopeId) {
        let program = self.program;
        let scope = program.scopes.get(id);
        let prefix = scope.prefix();
        for entry in scope.symbols() {
            self.add_definition(entry,&prefix);
        }
        for child in scope.children() {
            self.walk_scope(*child);
        }
    }
    fn collect_references(&mut self) {
        let program = self.program;
        let tree = &program.tree;
        let scopes = &program.scopes;
        let doc = self.doc;
        let mut refs: Vec<NamedSymbol> = Vec::new();
        tree.accept(&mut |_id,node| {
            if node.kind==NodeKind::SqRef {
                if let Some(sq) = &node.sq_ref {
                    let name = reference_name(scopes,sq.scope,&sq.path,sq.absolute);
                    let last_len = sq.path.last().map(|s| s.len()).unwrap_or(0);
                    let sel_start = node.end().saturating_sub(last_len).max(node.offset);
                    log::trace!("reference to {}",name);
                    refs.push(NamedSymbol {
                        name,
                        location: lsp::Location::new(doc.uri.clone(),node_range(doc,node)),
                        selection_range: doc.range_of(sel_start,node.end())
                    });
                }
            }
            true
        });
        for r in refs {
            self.symbols.references.entry(r.name.clone()).or_default().push(r);
        }
    }
}

/// Name a reference is recorded under.  If neither the path nor its loop normalized form
/// resolves, the normalized path is assumed to be declared in the referencing scope.
pub fn reference_name(scopes: &Scopes,scope: ScopeId,path: &[String],absolute: bool) -> String {
    if let Resolution::Resolved { name, .. } = scopes.resolve(scope,path,absolute) {
        return name;
    }
    let normalized: Vec<String> = path.iter().map(|s| normalize_segment(s)).collect();
    scopes.resolve(scope,&normalized,absolute).name().to_string()
}

/// Build the symbol table for a parsed document
pub fn process_symbols(doc: &Document,program: &ParsedProgram,with_comments: bool) -> Symbols {
    let mut collector = SymbolCollector {
        doc,
        program,
        with_comments,
        symbols: Symbols::default()
    };
    collector.walk_scope(program.scopes.root());
    collector.collect_references();
    log::debug!("{} definitions, {} referenced names",collector.symbols.definitions.len(),collector.symbols.references.len());
    collector.symbols
}

impl Symbols {
    pub fn definition_at_position(&self,pos: &lsp::Position) -> Option<&Definition> {
        self.definitions.values().find(|d| range_contains_pos(&d.selection_range,pos))
    }
    pub fn reference_at_position(&self,pos: &lsp::Position) -> Option<&NamedSymbol> {
        for refs in self.references.values() {
            if let Some(r) = refs.iter().find(|r| range_contains_pos(&r.location.range,pos)) {
                return Some(r);
            }
        }
        None
    }
    /// Definitions take precedence over references
    pub fn symbol_at_position(&self,pos: &lsp::Position) -> Option<SymbolHit<'_>> {
        if let Some(d) = self.definition_at_position(pos) {
            return Some(SymbolHit::Definition(d));
        }
        self.reference_at_position(pos).map(SymbolHit::Reference)
    }
    /// Definition of the symbol at the position, there is at most one
    pub fn get_definitions(&self,pos: &lsp::Position) -> Vec<&Definition> {
        let hit = match self.symbol_at_position(pos) {
            Some(h) => h,
            None => return Vec::new()
        };
        self.definitions.get(hit.name()).into_iter().collect()
    }
    /// References to the symbol at the position in document order, optionally followed by the definition
    pub fn get_references(&self,pos: &lsp::Position,include_declaration: bool) -> Vec<lsp::Location> {
        let hit = match self.symbol_at_position(pos) {
            Some(h) => h,
            None => return Vec::new()
        };
        let mut ans: Vec<lsp::Location> = match self.references.get(hit.name()) {
            Some(refs) => refs.iter().map(|r| r.location.clone()).collect(),
            None => Vec::new()
        };
        if include_declaration {
            if let Some(def) = self.definitions.get(hit.name()) {
                ans.push(def.location.clone());
            }
        }
        ans
    }
}
