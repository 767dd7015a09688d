//! Abstract syntax tree produced by `RcasmParser`.
//!
//! This is the shape the adapter consumes read-only.  Every node carries the byte span
//! of the source text it was parsed from.

/// Byte span into the parsed text, `end` is exclusive
#[derive(Clone,Copy,Debug,PartialEq,Default)]
pub struct Loc {
    pub start: usize,
    pub end: usize
}

#[derive(Clone,Debug,PartialEq)]
pub struct Program {
    pub lines: Vec<Line>,
    pub loc: Loc
}

/// A line may carry a label, a scoped statement block, and a statement, in any combination.
/// A line that has none of them is a blank or comment line.
#[derive(Clone,Debug,PartialEq)]
pub struct Line {
    pub label: Option<Label>,
    pub scoped_stmts: Option<Vec<Line>>,
    pub stmt: Option<Stmt>,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct Label {
    pub name: String,
    /// includes the colon
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct Ident {
    pub name: String,
    pub loc: Loc
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum DataSize {
    Byte,
    Word
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtInsn {
    pub mnemonic: String,
    pub p1: Option<Expr>,
    pub p2: Option<Expr>,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtSetPc {
    pub pc: Expr,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtData {
    pub data_size: DataSize,
    pub values: Vec<Expr>,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtFill {
    pub num_bytes: Expr,
    pub fill_value: Expr,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtAlign {
    pub align_bytes: Expr,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtLet {
    pub name: Ident,
    pub value: Expr,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtFor {
    pub index: Ident,
    pub list: Expr,
    pub body: Vec<Line>,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtIfElse {
    /// condition and body for `!if` and each `elif`
    pub cases: Vec<(Expr,Vec<Line>)>,
    pub else_branch: Option<Vec<Line>>,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub struct StmtError {
    pub error: String,
    pub loc: Loc
}

#[derive(Clone,Debug,PartialEq)]
pub enum Stmt {
    Insn(StmtInsn),
    SetPc(StmtSetPc),
    Data(StmtData),
    Fill(StmtFill),
    Align(StmtAlign),
    Let(StmtLet),
    For(StmtFor),
    If(StmtIfElse),
    Error(StmtError)
}

#[derive(Clone,Debug,PartialEq)]
pub enum LiteralValue {
    Number(i64),
    Str(String)
}

#[derive(Clone,Debug,PartialEq)]
pub enum Expr {
    Literal { value: LiteralValue, loc: Loc },
    Register { value: String, loc: Loc },
    QualifiedIdent { path: Vec<String>, absolute: bool, loc: Loc },
    Ident(Ident),
    Binary { op: String, left: Box<Expr>, right: Box<Expr>, loc: Loc },
    Unary { op: String, expr: Box<Expr>, loc: Loc },
    CallFunc { callee: Box<Expr>, args: Vec<Expr>, loc: Loc },
    GetCurPc { loc: Loc }
}

impl Line {
    /// blank and comment lines have nothing to adapt
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.scoped_stmts.is_none() && self.stmt.is_none()
    }
}

impl Stmt {
    pub fn loc(&self) -> Loc {
        match self {
            Self::Insn(s) => s.loc,
            Self::SetPc(s) => s.loc,
            Self::Data(s) => s.loc,
            Self::Fill(s) => s.loc,
            Self::Align(s) => s.loc,
            Self::Let(s) => s.loc,
            Self::For(s) => s.loc,
            Self::If(s) => s.loc,
            Self::Error(s) => s.loc
        }
    }
}

impl Expr {
    pub fn loc(&self) -> Loc {
        match self {
            Self::Literal { loc, .. } => *loc,
            Self::Register { loc, .. } => *loc,
            Self::QualifiedIdent { loc, .. } => *loc,
            Self::Ident(i) => i.loc,
            Self::Binary { loc, .. } => *loc,
            Self::Unary { loc, .. } => *loc,
            Self::CallFunc { loc, .. } => *loc,
            Self::GetCurPc { loc } => *loc
        }
    }
}
