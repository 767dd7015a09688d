//! # Adapted node tree
//!
//! The tree is an arena of `Node` indexed by `NodeId`, the root `Program` node is always `0`.
//! Children are listed in source order, and each node links back to its parent.
//! Nodes are only added by the adapter, after that the tree is read-only.

use super::scopes::ScopeId;
use crate::lang::WalkerChoice;

pub type NodeId = usize;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum NodeKind {
    Program,
    Line,
    Label,
    Instruction,
    Literal,
    Register,
    SetPc,
    Directive,
    Scope,
    CurrentPc,
    BinaryOp,
    UnaryOp,
    CallFunc,
    Variable,
    Ref,
    SqRef
}

#[derive(Clone,Debug,PartialEq)]
pub enum NodeValue {
    Text(String),
    Number(i64)
}

/// Scope qualified reference, `scope` is the scope that was active where the reference appears
#[derive(Clone,Debug,PartialEq)]
pub struct SqRef {
    pub path: Vec<String>,
    pub absolute: bool,
    pub scope: ScopeId
}

#[derive(Clone,Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: usize,
    pub length: usize,
    pub value: Option<NodeValue>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub sq_ref: Option<SqRef>
}

impl Node {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
    /// textual value, if there is one
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(NodeValue::Text(s)) => Some(s),
            _ => None
        }
    }
}

impl std::fmt::Display for NodeValue {
    fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f,"{}",s),
            Self::Number(n) => write!(f,"{}",n)
        }
    }
}

pub struct Tree {
    nodes: Vec<Node>
}

impl Tree {
    /// Create a tree with only the `Program` root
    pub fn new(offset: usize,length: usize) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Program,
                offset,
                length,
                value: None,
                parent: None,
                children: Vec::new(),
                sq_ref: None
            }]
        }
    }
    pub fn root(&self) -> NodeId {
        0
    }
    pub fn get(&self,id: NodeId) -> &Node {
        &self.nodes[id]
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    /// Create a node and append it to the children of `parent`
    pub fn adopt_child(&mut self,parent: NodeId,kind: NodeKind,offset: usize,length: usize,value: Option<NodeValue>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            offset,
            length,
            value,
            parent: Some(parent),
            children: Vec::new(),
            sq_ref: None
        });
        self.nodes[parent].children.push(id);
        id
    }
    pub fn set_sq_ref(&mut self,id: NodeId,sq_ref: SqRef) {
        self.nodes[id].sq_ref = Some(sq_ref);
    }
    /// Depth first walk in source order, starting with the root.
    /// Children are skipped if the visitor returns false.
    pub fn accept<F>(&self,visitor: &mut F) where F: FnMut(NodeId,&Node) -> bool {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if visitor(id,node) {
                for child in node.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
    }
    /// Find the shortest node containing the offset, both ends of a node count as inside.
    /// When lengths tie, the node visited later wins, which is the more deeply nested one.
    pub fn node_at_offset(&self,offset: usize) -> Option<NodeId> {
        let root = self.get(self.root());
        if offset < root.offset || offset > root.end() {
            return None;
        }
        let mut candidate: Option<NodeId> = None;
        self.accept(&mut |id,node| {
            if node.offset <= offset && node.end() >= offset {
                match candidate {
                    Some(c) if node.length > self.nodes[c].length => {},
                    _ => candidate = Some(id)
                }
                return true;
            }
            false
        });
        candidate
    }
    /// Nodes from the root down to the node at the offset
    pub fn node_path(&self,offset: usize) -> Vec<NodeId> {
        let mut ans = Vec::new();
        let mut curr = self.node_at_offset(offset);
        while let Some(id) = curr {
            ans.push(id);
            curr = self.nodes[id].parent;
        }
        ans.reverse();
        ans
    }
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor { tree: self, id: self.root() }
    }
}

/// Cursor over the tree with the moves a `Visit` walk needs
pub struct TreeCursor<'a> {
    tree: &'a Tree,
    id: NodeId
}

impl<'a> TreeCursor<'a> {
    pub fn node(&self) -> &'a Node {
        self.tree.get(self.id)
    }
    pub fn id(&self) -> NodeId {
        self.id
    }
    pub fn goto_first_child(&mut self) -> bool {
        match self.tree.get(self.id).children.first() {
            Some(child) => {
                self.id = *child;
                true
            },
            None => false
        }
    }
    pub fn goto_next_sibling(&mut self) -> bool {
        let parent = match self.tree.get(self.id).parent {
            Some(p) => p,
            None => return false
        };
        let siblings = &self.tree.get(parent).children;
        match siblings.iter().position(|s| *s==self.id) {
            Some(i) if i + 1 < siblings.len() => {
                self.id = siblings[i+1];
                true
            },
            _ => false
        }
    }
    pub fn goto_parent(&mut self) -> bool {
        match self.tree.get(self.id).parent {
            Some(p) => {
                self.id = p;
                true
            },
            None => false
        }
    }
}

pub trait Visit {
    fn visit(&mut self,curs: &TreeCursor) -> WalkerChoice;
    fn walk(&mut self,tree: &Tree)
    {
        let mut curs = tree.walk();
        let mut choice = WalkerChoice::GotoChild;
        while ! matches!(choice,WalkerChoice::Exit)
        {
            if matches!(choice,WalkerChoice::GotoChild) && curs.goto_first_child() {
                choice = self.visit(&curs);
            } else if matches!(choice,WalkerChoice::GotoParentSibling) && curs.goto_parent() && curs.goto_next_sibling() {
                choice = self.visit(&curs);
            } else if matches!(choice,WalkerChoice::GotoSibling) && curs.goto_next_sibling() {
                choice = self.visit(&curs);
            } else if curs.goto_next_sibling() {
                choice = self.visit(&curs);
            } else if curs.goto_parent() {
                choice = WalkerChoice::GotoSibling;
            } else {
                choice = WalkerChoice::Exit;
            }
        }
    }
}
