//! # Tree adapter
//!
//! Converts the parser's AST into the node tree while building the scope tree.
//! Both have to be built in one pass, because a reference records the scope that is active
//! at the point where the reference is adapted.

use super::ast;
use super::nodes::{NodeId,NodeKind,NodeValue,SqRef,Tree};
use super::parser::RcasmParser;
use super::scopes::Scopes;

/// Everything the analysis needs from one parse
pub struct ParsedProgram {
    pub tree: Tree,
    pub scopes: Scopes
}

/// Parse and adapt the text.  A syntax error yields an empty `Program`.
pub fn parse(text: &str) -> ParsedProgram {
    let mut parser = RcasmParser::new();
    match parser.parse(text) {
        Ok(program) => adapt(Some(&program)),
        Err(e) => {
            log::debug!("document does not parse: {}",e);
            adapt(None)
        }
    }
}

/// Adapt the AST, a missing AST gives the empty `Program` at offset 0
pub fn adapt(program: Option<&ast::Program>) -> ParsedProgram {
    let mut adapter = TreeAdapter {
        tree: match program {
            Some(p) => Tree::new(p.loc.start,p.loc.end - p.loc.start),
            None => Tree::new(0,0)
        },
        scopes: Scopes::new()
    };
    if let Some(p) = program {
        let root = adapter.tree.root();
        adapter.lines(root,&p.lines);
    }
    ParsedProgram {
        tree: adapter.tree,
        scopes: adapter.scopes
    }
}

struct TreeAdapter {
    tree: Tree,
    scopes: Scopes
}

fn text(s: &str) -> Option<NodeValue> {
    Some(NodeValue::Text(s.to_string()))
}

impl TreeAdapter {
    fn add(&mut self,parent: NodeId,kind: NodeKind,loc: ast::Loc,value: Option<NodeValue>) -> NodeId {
        self.tree.adopt_child(parent,kind,loc.start,loc.end - loc.start,value)
    }
    fn lines(&mut self,parent: NodeId,lines: &[ast::Line]) {
        for line in lines.iter().filter(|l| !l.is_empty()) {
            self.line(parent,line);
        }
    }
    /// Adapt lines inside the child scope `name` of the current scope
    fn lines_in_scope(&mut self,parent: NodeId,name: &str,lines: &[ast::Line]) {
        let prev = self.scopes.enter(name);
        self.lines(parent,lines);
        self.scopes.leave(prev);
    }
    fn line(&mut self,parent: NodeId,line: &ast::Line) {
        let id = self.add(parent,NodeKind::Line,line.loc,None);
        let label_name = line.label.as_ref().map(|l| l.name.as_str());
        if let Some(label) = &line.label {
            let loc = ast::Loc { start: label.loc.start, end: label.loc.start + label.name.len() };
            let lab = self.add(id,NodeKind::Label,loc,text(&label.name));
            if !self.scopes.symbol_seen(&label.name) {
                self.scopes.declare_label(&label.name,lab);
            }
        }
        if let Some(stmts) = &line.scoped_stmts {
            let name = label_name.unwrap_or("?");
            let scp = self.add(id,NodeKind::Scope,line.loc,text(name));
            self.lines_in_scope(scp,name,stmts);
        }
        if let Some(stmt) = &line.stmt {
            self.stmt(id,stmt,label_name);
        }
    }
    fn directive(&mut self,parent: NodeId,loc: ast::Loc,mnemonic: &str) -> NodeId {
        self.add(parent,NodeKind::Directive,loc,text(mnemonic))
    }
    fn variable(&mut self,parent: NodeId,ident: &ast::Ident) -> NodeId {
        let id = self.add(parent,NodeKind::Variable,ident.loc,text(&ident.name));
        self.scopes.declare_var(&ident.name,id);
        id
    }
    fn stmt(&mut self,parent: NodeId,stmt: &ast::Stmt,label: Option<&str>) {
        match stmt {
            ast::Stmt::Insn(s) => {
                let id = self.add(parent,NodeKind::Instruction,s.loc,text(&s.mnemonic));
                for p in [&s.p1,&s.p2].into_iter().flatten() {
                    self.expr(id,p);
                }
            },
            ast::Stmt::SetPc(s) => {
                let id = self.add(parent,NodeKind::SetPc,s.loc,None);
                self.expr(id,&s.pc);
            },
            ast::Stmt::Data(s) => {
                let mnemonic = match s.data_size {
                    ast::DataSize::Byte => "!byte",
                    ast::DataSize::Word => "!word"
                };
                let id = self.directive(parent,s.loc,mnemonic);
                for v in &s.values {
                    self.expr(id,v);
                }
            },
            ast::Stmt::Fill(s) => {
                let id = self.directive(parent,s.loc,"!fill");
                self.expr(id,&s.num_bytes);
                self.expr(id,&s.fill_value);
            },
            ast::Stmt::Align(s) => {
                let id = self.directive(parent,s.loc,"!align");
                self.expr(id,&s.align_bytes);
            },
            ast::Stmt::Let(s) => {
                let id = self.directive(parent,s.loc,"!let");
                self.variable(id,&s.name);
                self.expr(id,&s.value);
            },
            ast::Stmt::Error(s) => {
                self.directive(parent,s.loc,"!error");
            },
            ast::Stmt::For(s) => {
                let id = self.directive(parent,s.loc,"!for");
                let name = match label {
                    Some(l) => format!("{}__n",l),
                    None => self.scopes.anon_scope_name()
                };
                // the list is evaluated outside the loop, the index lives in the body
                let prev = self.scopes.enter(&name);
                self.variable(id,&s.index);
                self.scopes.leave(prev);
                self.expr(id,&s.list);
                self.lines_in_scope(id,&name,&s.body);
            },
            ast::Stmt::If(s) => {
                let id = self.directive(parent,s.loc,"!if");
                for (cond,body) in &s.cases {
                    self.expr(id,cond);
                    let name = self.branch_scope_name(label);
                    self.lines_in_scope(id,&name,body);
                }
                if let Some(body) = &s.else_branch {
                    let name = self.branch_scope_name(label);
                    self.lines_in_scope(id,&name,body);
                }
            }
        }
    }
    fn branch_scope_name(&mut self,label: Option<&str>) -> String {
        match label {
            Some(l) => l.to_string(),
            None => self.scopes.anon_scope_name()
        }
    }
    fn expr(&mut self,parent: NodeId,expr: &ast::Expr) -> NodeId {
        match expr {
            ast::Expr::Literal { value, loc } => {
                let val = match value {
                    ast::LiteralValue::Number(n) => NodeValue::Number(*n),
                    ast::LiteralValue::Str(s) => NodeValue::Text(s.clone())
                };
                self.add(parent,NodeKind::Literal,*loc,Some(val))
            },
            ast::Expr::Register { value, loc } => self.add(parent,NodeKind::Register,*loc,text(value)),
            ast::Expr::QualifiedIdent { path, absolute, loc } => {
                let joined = path.join("::");
                let val = if *absolute { ["::",&joined].concat() } else { joined };
                let id = self.add(parent,NodeKind::SqRef,*loc,Some(NodeValue::Text(val)));
                self.tree.set_sq_ref(id,SqRef {
                    path: path.clone(),
                    absolute: *absolute,
                    scope: self.scopes.current()
                });
                id
            },
            ast::Expr::Ident(ident) => self.add(parent,NodeKind::Ref,ident.loc,text(&ident.name)),
            ast::Expr::Binary { op, left, right, loc } => {
                let id = self.add(parent,NodeKind::BinaryOp,*loc,text(op));
                self.expr(id,left);
                self.expr(id,right);
                id
            },
            ast::Expr::Unary { op, expr, loc } => {
                let id = self.add(parent,NodeKind::UnaryOp,*loc,text(op));
                self.expr(id,expr);
                id
            },
            ast::Expr::CallFunc { callee, args, loc } => {
                let id = self.add(parent,NodeKind::CallFunc,*loc,None);
                self.expr(id,callee);
                for a in args {
                    self.expr(id,a);
                }
                id
            },
            ast::Expr::GetCurPc { loc } => self.add(parent,NodeKind::CurrentPc,*loc,None)
        }
    }
}
