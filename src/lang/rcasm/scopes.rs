//! # Named scopes
//!
//! Scopes form a tree whose root has an empty name.  Every scope owns a table of the
//! symbols declared directly in it, and the child scopes opened inside it, by name.
//! Scopes are kept in an arena and referred to by `ScopeId`, the root is always `0`.
//!
//! Shadowing falls out of the lookup order: a name is searched in the current scope first,
//! then in each enclosing scope.  Declarations never look outside the current scope.

use std::collections::HashMap;
use super::nodes::{NodeId,SqRef};

pub type ScopeId = usize;

#[derive(Clone,Debug,PartialEq)]
pub enum SymEntry {
    Label { name: String, node: NodeId },
    Var { name: String, node: NodeId }
}

impl SymEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Label { name, .. } => name,
            Self::Var { name, .. } => name
        }
    }
    pub fn node(&self) -> NodeId {
        match self {
            Self::Label { node, .. } => *node,
            Self::Var { node, .. } => *node
        }
    }
}

#[derive(Clone,Debug)]
pub struct NamedScope {
    pub name: String,
    pub parent: Option<ScopeId>,
    /// names of the enclosing scopes and this one, root excluded
    pub path: Vec<String>,
    syms: HashMap<String,SymEntry>,
    sym_order: Vec<String>,
    children: HashMap<String,ScopeId>,
    child_order: Vec<ScopeId>
}

impl NamedScope {
    fn new(name: &str,parent: Option<(ScopeId,&NamedScope)>) -> Self {
        let (parent,path) = match parent {
            Some((id,p)) => {
                let mut path = p.path.clone();
                path.push(name.to_string());
                (Some(id),path)
            },
            None => (None,Vec::new())
        };
        Self {
            name: name.to_string(),
            parent,
            path,
            syms: HashMap::new(),
            sym_order: Vec::new(),
            children: HashMap::new(),
            child_order: Vec::new()
        }
    }
    pub fn get_symbol(&self,name: &str) -> Option<&SymEntry> {
        self.syms.get(name)
    }
    /// symbols in order of declaration
    pub fn symbols(&self) -> Vec<&SymEntry> {
        self.sym_order.iter().filter_map(|n| self.syms.get(n)).collect()
    }
    pub fn get_child(&self,name: &str) -> Option<ScopeId> {
        self.children.get(name).copied()
    }
    /// child scopes in order of creation
    pub fn children(&self) -> &[ScopeId] {
        &self.child_order
    }
    /// Qualifier for names declared in this scope, e.g., `outer::inner::`, empty for the root.
    pub fn prefix(&self) -> String {
        self.path.iter().map(|s| [s.as_str(),"::"].concat()).collect()
    }
}

/// Outcome of resolving a qualified name.
/// Either way the fully qualified name is defined, an unmatched name is assumed to be
/// declared locally so that it still has a stable identity.
#[derive(Clone,Debug,PartialEq)]
pub enum Resolution {
    Resolved { name: String, scope: ScopeId, entry: SymEntry },
    Assumed { name: String }
}

impl Resolution {
    pub fn name(&self) -> &str {
        match self {
            Self::Resolved { name, .. } => name,
            Self::Assumed { name } => name
        }
    }
    pub fn entry(&self) -> Option<&SymEntry> {
        match self {
            Self::Resolved { entry, .. } => Some(entry),
            Self::Assumed { .. } => None
        }
    }
}

/// The scope tree plus the state needed while it is being built.
/// The anonymous scope counter is per instance, so every parse starts from zero.
pub struct Scopes {
    scopes: Vec<NamedScope>,
    current: ScopeId,
    anon_count: usize
}

impl Scopes {
    pub fn new() -> Self {
        Self {
            scopes: vec![NamedScope::new("",None)],
            current: 0,
            anon_count: 0
        }
    }
    pub fn root(&self) -> ScopeId {
        0
    }
    pub fn current(&self) -> ScopeId {
        self.current
    }
    pub fn get(&self,id: ScopeId) -> &NamedScope {
        &self.scopes[id]
    }
    pub fn len(&self) -> usize {
        self.scopes.len()
    }
    /// Child of `parent` with the given name, created if it does not exist yet
    pub fn new_scope(&mut self,name: &str,parent: ScopeId) -> ScopeId {
        if let Some(existing) = self.scopes[parent].get_child(name) {
            return existing;
        }
        let id = self.scopes.len();
        let scope = NamedScope::new(name,Some((parent,&self.scopes[parent])));
        self.scopes.push(scope);
        self.scopes[parent].children.insert(name.to_string(),id);
        self.scopes[parent].child_order.push(id);
        id
    }
    /// Reserve the next anonymous scope name, every call gives a new one
    pub fn anon_scope_name(&mut self) -> String {
        let ans = format!("__anon_scope_{}",self.anon_count);
        self.anon_count += 1;
        ans
    }
    /// Open (or reopen) a child of the current scope and make it current,
    /// returns the scope to restore with `leave`.
    pub fn enter(&mut self,name: &str) -> ScopeId {
        let prev = self.current;
        self.current = self.new_scope(name,prev);
        log::trace!("enter scope {}",self.scopes[self.current].prefix());
        prev
    }
    pub fn leave(&mut self,prev: ScopeId) {
        self.current = prev;
    }
    /// Insert into the local table of the scope, the first declaration of a name wins
    pub fn add_symbol(&mut self,scope: ScopeId,name: &str,entry: SymEntry) {
        let tab = &mut self.scopes[scope];
        if tab.syms.contains_key(name) {
            log::trace!("ignoring redeclaration of {}{}",tab.prefix(),name);
            return;
        }
        tab.syms.insert(name.to_string(),entry);
        tab.sym_order.push(name.to_string());
    }
    /// Is the name declared in the current scope, enclosing scopes are not consulted
    pub fn symbol_seen(&self,name: &str) -> bool {
        self.scopes[self.current].syms.contains_key(name)
    }
    /// Declare a label in the current scope.
    /// Panics if the name is already taken by a variable, the caller checks `symbol_seen` first.
    pub fn declare_label(&mut self,name: &str,node: NodeId) {
        if let Some(prev) = self.scopes[self.current].syms.get(name) {
            if !matches!(prev,SymEntry::Label { .. }) {
                panic!("declare_label called on the variable {}",name);
            }
            return;
        }
        self.add_symbol(self.current,name,SymEntry::Label { name: name.to_string(), node });
    }
    pub fn declare_var(&mut self,name: &str,node: NodeId) {
        self.add_symbol(self.current,name,SymEntry::Var { name: name.to_string(), node });
    }
    /// Search `from` and then each enclosing scope for the bare name
    pub fn find_symbol(&self,from: ScopeId,name: &str) -> Option<(ScopeId,&SymEntry)> {
        let mut curr = Some(from);
        while let Some(id) = curr {
            if let Some(entry) = self.scopes[id].syms.get(name) {
                return Some((id,entry));
            }
            curr = self.scopes[id].parent;
        }
        None
    }
    /// Resolve a path such as `a::b::c` relative to `from`.
    /// Go up until a scope has a child named `a`, then down through `b`, then look up `c` in that scope only.
    pub fn find_symbol_path(&self,from: ScopeId,path: &[String]) -> Option<(ScopeId,&SymEntry)> {
        match path.len() {
            0 => None,
            1 => self.find_symbol(from,&path[0]),
            _ => {
                let mut tab = from;
                while self.scopes[tab].get_child(&path[0]).is_none() {
                    tab = self.scopes[tab].parent?;
                }
                for seg in &path[0..path.len()-1] {
                    tab = self.scopes[tab].get_child(seg)?;
                }
                let entry = self.scopes[tab].syms.get(&path[path.len()-1])?;
                Some((tab,entry))
            }
        }
    }
    /// Resolve a path starting from `from`, or from the root if `absolute`.
    /// An unmatched path resolves to the qualified name it would have if declared in `from`.
    pub fn resolve(&self,from: ScopeId,path: &[String],absolute: bool) -> Resolution {
        let start = if absolute { self.root() } else { from };
        match self.find_symbol_path(start,path) {
            Some((scope,entry)) => Resolution::Resolved {
                name: [self.scopes[scope].prefix(),entry.name().to_string()].concat(),
                scope,
                entry: entry.clone()
            },
            None => {
                let prefix = if absolute { String::new() } else { self.scopes[from].prefix() };
                Resolution::Assumed { name: [prefix,path.join("::")].concat() }
            }
        }
    }
    pub fn find_qualified_symbol(&self,sq_ref: &SqRef) -> Resolution {
        self.resolve(sq_ref.scope,&sq_ref.path,sq_ref.absolute)
    }
}
