//! # rcasm parser
//!
//! Produces the AST of `super::ast` from the complete text of a document.
//! The parser is all-or-nothing: any error aborts the parse, the caller decides how to degrade.
//! Each line is one statement; blocks in braces may span lines or sit on one line.

use super::ast::*;
use crate::lang::Error;
use crate::DYNERR;

const TWO_CHAR_OPS: [&str;9] = ["::","<<",">>","<=",">=","==","!=","&&","||"];
const ONE_CHAR_OPS: &str = "{}()[],:=+-*/%&|^~<>.#!";
/// limit on blocks, parentheses, call arguments and unary operators nested in each other
const MAX_NESTING: usize = 64;
/// limit on the height of an expression tree
const MAX_EXPR_DEPTH: usize = 256;

#[derive(Clone,Debug,PartialEq)]
enum Tok {
    Ident(String),
    Number(i64),
    Str(String),
    /// directive name without the `!`, lower case
    Directive(String),
    Punct(String),
    Newline,
    Eof
}

#[derive(Clone,Debug)]
struct Token {
    tok: Tok,
    start: usize,
    end: usize
}

fn parse_number(txt: &str) -> Result<i64,DYNERR> {
    let lower = txt.to_lowercase();
    let ans = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex,16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin,2)
    } else if let Some(bin) = lower.strip_suffix('b') {
        i64::from_str_radix(bin,2)
    } else {
        lower.parse::<i64>()
    };
    match ans {
        Ok(n) => Ok(n),
        Err(_) => Err(Box::new(Error::BadNumber))
    }
}

/// A directive can only appear where a statement can start, elsewhere `!` is logical not
fn starts_statement(prev: &[Token]) -> bool {
    match prev.last() {
        None => true,
        Some(t) => match &t.tok {
            Tok::Newline => true,
            Tok::Punct(p) => p==":" || p=="{" || p=="}",
            _ => false
        }
    }
}

fn lex(text: &str) -> Result<Vec<Token>,DYNERR> {
    let bytes = text.as_bytes();
    let mut ans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;
        if c == ' ' || c == '\t' || c == '\r' {
            i += 1;
        } else if c == ';' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if c == '\n' {
            i += 1;
            ans.push(Token { tok: Tok::Newline, start, end: i });
        } else if c.is_ascii_alphabetic() || c == '_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            ans.push(Token { tok: Tok::Ident(text[start..i].to_string()), start, end: i });
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let n = parse_number(&text[start..i])?;
            ans.push(Token { tok: Tok::Number(n), start, end: i });
        } else if c == '$' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                i += 1;
            }
            match i64::from_str_radix(&text[start+1..i],16) {
                Ok(n) => ans.push(Token { tok: Tok::Number(n), start, end: i }),
                Err(_) => return Err(Box::new(Error::BadNumber))
            }
        } else if c == '"' || c == '\'' {
            i += 1;
            let mut s = String::new();
            loop {
                if i >= bytes.len() || bytes[i] == b'\n' {
                    return Err(Box::new(Error::UnterminatedString));
                }
                let ch = match text[i..].chars().next() {
                    Some(ch) => ch,
                    None => return Err(Box::new(Error::UnterminatedString))
                };
                i += ch.len_utf8();
                if ch == c {
                    break;
                }
                if ch == '\\' && i < bytes.len() && bytes[i] != b'\n' {
                    if let Some(esc) = text[i..].chars().next() {
                        s.push(esc);
                        i += esc.len_utf8();
                    }
                    continue;
                }
                s.push(ch);
            }
            ans.push(Token { tok: Tok::Str(s), start, end: i });
        } else if c == '!' && i + 1 < bytes.len() && bytes[i+1].is_ascii_alphabetic() && starts_statement(&ans) {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            ans.push(Token { tok: Tok::Directive(text[start+1..i].to_lowercase()), start, end: i });
        } else if i + 1 < bytes.len() && text.is_char_boundary(i + 2) && TWO_CHAR_OPS.contains(&&text[i..i+2]) {
            i += 2;
            ans.push(Token { tok: Tok::Punct(text[start..i].to_string()), start, end: i });
        } else if text[i..].starts_with('§') {
            i += '§'.len_utf8();
            ans.push(Token { tok: Tok::Punct("§".to_string()), start, end: i });
        } else if ONE_CHAR_OPS.contains(c) {
            i += 1;
            ans.push(Token { tok: Tok::Punct(c.to_string()), start, end: i });
        } else {
            log::debug!("unexpected character at offset {}",i);
            return Err(Box::new(Error::Syntax));
        }
    }
    ans.push(Token { tok: Tok::Eof, start: bytes.len(), end: bytes.len() });
    Ok(ans)
}

fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "|" => Some(3),
        "^" => Some(4),
        "&" => Some(5),
        "==" | "!=" => Some(6),
        "<" | "<=" | ">" | ">=" => Some(7),
        "<<" | ">>" => Some(8),
        "+" | "-" => Some(9),
        "*" | "/" | "%" => Some(10),
        "§" => Some(11),
        _ => None
    }
}

pub struct RcasmParser {
    toks: Vec<Token>,
    pos: usize,
    prev_end: usize,
    nesting: usize,
    /// height of the expression that was parsed last
    expr_depth: usize
}

impl RcasmParser {
    pub fn new() -> Self {
        Self {
            toks: Vec::new(),
            pos: 0,
            prev_end: 0,
            nesting: 0,
            expr_depth: 0
        }
    }
    /// Parse a complete document, any error means there is no AST.
    pub fn parse(&mut self,text: &str) -> Result<Program,DYNERR> {
        self.toks = lex(text)?;
        self.pos = 0;
        self.prev_end = 0;
        self.nesting = 0;
        self.expr_depth = 0;
        let lines = self.parse_lines(false)?;
        Ok(Program {
            lines,
            loc: Loc { start: 0, end: text.len() }
        })
    }
    fn peek(&self) -> &Tok {
        match self.toks.get(self.pos) {
            Some(t) => &t.tok,
            None => &Tok::Eof
        }
    }
    fn peek_at(&self,ahead: usize) -> &Tok {
        match self.toks.get(self.pos + ahead) {
            Some(t) => &t.tok,
            None => &Tok::Eof
        }
    }
    fn cur_start(&self) -> usize {
        match self.toks.get(self.pos) {
            Some(t) => t.start,
            None => self.prev_end
        }
    }
    fn advance(&mut self) -> Token {
        let ans = match self.toks.get(self.pos) {
            Some(t) => t.clone(),
            None => Token { tok: Tok::Eof, start: self.prev_end, end: self.prev_end }
        };
        if ans.tok != Tok::Eof {
            self.pos += 1;
            self.prev_end = ans.end;
        }
        ans
    }
    fn is_punct(&self,p: &str) -> bool {
        matches!(self.peek(),Tok::Punct(s) if s==p)
    }
    fn is_keyword(&self,kw: &str) -> bool {
        matches!(self.peek(),Tok::Ident(s) if s.to_lowercase()==kw)
    }
    fn expect_punct(&mut self,p: &str) -> Result<Token,DYNERR> {
        if self.is_punct(p) {
            return Ok(self.advance());
        }
        log::debug!("expected `{}` at offset {}",p,self.cur_start());
        Err(Box::new(Error::Syntax))
    }
    fn expect_ident(&mut self) -> Result<Ident,DYNERR> {
        let tok = self.advance();
        match tok.tok {
            Tok::Ident(name) => Ok(Ident { name, loc: Loc { start: tok.start, end: tok.end } }),
            _ => {
                log::debug!("expected identifier at offset {}",tok.start);
                Err(Box::new(Error::Syntax))
            }
        }
    }
    fn nest(&mut self) -> Result<(),DYNERR> {
        if self.nesting >= MAX_NESTING {
            log::debug!("nesting too deep at offset {}",self.cur_start());
            return Err(Box::new(Error::Syntax));
        }
        self.nesting += 1;
        Ok(())
    }
    fn unnest(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }
    fn set_expr_depth(&mut self,depth: usize) -> Result<(),DYNERR> {
        if depth > MAX_EXPR_DEPTH {
            log::debug!("expression too deep at offset {}",self.cur_start());
            return Err(Box::new(Error::Syntax));
        }
        self.expr_depth = depth;
        Ok(())
    }
    fn at_line_end(&self) -> bool {
        matches!(self.peek(),Tok::Newline | Tok::Eof) || self.is_punct("}")
    }
    fn parse_lines(&mut self,in_block: bool) -> Result<Vec<Line>,DYNERR> {
        let mut ans = Vec::new();
        loop {
            match self.peek() {
                Tok::Eof => {
                    if in_block {
                        return Err(Box::new(Error::UnbalancedBlock));
                    }
                    return Ok(ans);
                },
                Tok::Newline => {
                    let tok = self.advance();
                    ans.push(Line {
                        label: None,
                        scoped_stmts: None,
                        stmt: None,
                        loc: Loc { start: tok.start, end: tok.start }
                    });
                },
                Tok::Punct(p) if p=="}" => {
                    if in_block {
                        return Ok(ans);
                    }
                    return Err(Box::new(Error::UnbalancedBlock));
                },
                _ => ans.push(self.parse_line()?)
            }
        }
    }
    fn parse_block(&mut self) -> Result<Vec<Line>,DYNERR> {
        self.expect_punct("{")?;
        self.nest()?;
        let ans = self.parse_lines(true)?;
        self.unnest();
        self.expect_punct("}")?;
        Ok(ans)
    }
    fn parse_line(&mut self) -> Result<Line,DYNERR> {
        let start = self.cur_start();
        let mut label = None;
        let mut scoped_stmts = None;
        let mut stmt = None;
        let is_label = matches!(self.peek(),Tok::Ident(_)) && matches!(self.peek_at(1),Tok::Punct(p) if p==":");
        if is_label {
            let tok = self.advance();
            let colon = self.advance();
            if let Tok::Ident(name) = tok.tok {
                label = Some(Label { name, loc: Loc { start: tok.start, end: colon.end } });
            }
        }
        if self.is_punct("{") {
            scoped_stmts = Some(self.parse_block()?);
        } else if !self.at_line_end() {
            stmt = Some(self.parse_stmt()?);
        }
        let end = self.prev_end;
        match self.peek() {
            Tok::Newline => {
                self.advance();
            },
            Tok::Eof => {},
            Tok::Punct(p) if p=="}" => {},
            _ => {
                log::debug!("unexpected token at offset {}",self.cur_start());
                return Err(Box::new(Error::Syntax));
            }
        }
        Ok(Line {
            label,
            scoped_stmts,
            stmt,
            loc: Loc { start, end: usize::max(start,end) }
        })
    }
    fn parse_stmt(&mut self) -> Result<Stmt,DYNERR> {
        let start = self.cur_start();
        match self.peek().clone() {
            Tok::Directive(d) => {
                self.advance();
                match d.as_str() {
                    "byte" | "word" => {
                        let mut values = vec![self.parse_expr(0)?];
                        while self.is_punct(",") {
                            self.advance();
                            values.push(self.parse_expr(0)?);
                        }
                        let data_size = if d=="byte" { DataSize::Byte } else { DataSize::Word };
                        Ok(Stmt::Data(StmtData { data_size, values, loc: self.loc_from(start) }))
                    },
                    "fill" => {
                        let num_bytes = self.parse_expr(0)?;
                        self.expect_punct(",")?;
                        let fill_value = self.parse_expr(0)?;
                        Ok(Stmt::Fill(StmtFill { num_bytes, fill_value, loc: self.loc_from(start) }))
                    },
                    "align" => {
                        let align_bytes = self.parse_expr(0)?;
                        Ok(Stmt::Align(StmtAlign { align_bytes, loc: self.loc_from(start) }))
                    },
                    "let" => {
                        let name = self.expect_ident()?;
                        self.expect_punct("=")?;
                        let value = self.parse_expr(0)?;
                        Ok(Stmt::Let(StmtLet { name, value, loc: self.loc_from(start) }))
                    },
                    "for" => {
                        let index = self.expect_ident()?;
                        if !self.is_keyword("in") {
                            log::debug!("expected `in` at offset {}",self.cur_start());
                            return Err(Box::new(Error::Syntax));
                        }
                        self.advance();
                        let list = self.parse_expr(0)?;
                        let body = self.parse_block()?;
                        Ok(Stmt::For(StmtFor { index, list, body, loc: self.loc_from(start) }))
                    },
                    "if" => self.parse_if(start),
                    "error" => {
                        let tok = self.advance();
                        match tok.tok {
                            Tok::Str(error) => Ok(Stmt::Error(StmtError { error, loc: self.loc_from(start) })),
                            _ => Err(Box::new(Error::Syntax))
                        }
                    },
                    _ => {
                        log::debug!("unknown directive `!{}`",d);
                        Err(Box::new(Error::UnknownDirective))
                    }
                }
            },
            Tok::Ident(mnemonic) => {
                self.advance();
                if mnemonic.to_lowercase() == "org" {
                    let pc = self.parse_expr(0)?;
                    return Ok(Stmt::SetPc(StmtSetPc { pc, loc: self.loc_from(start) }));
                }
                let mut p1 = None;
                let mut p2 = None;
                if !self.at_line_end() {
                    p1 = Some(self.parse_expr(0)?);
                    if self.is_punct(",") {
                        self.advance();
                        p2 = Some(self.parse_expr(0)?);
                    }
                }
                Ok(Stmt::Insn(StmtInsn { mnemonic, p1, p2, loc: self.loc_from(start) }))
            },
            _ => {
                log::debug!("expected statement at offset {}",start);
                Err(Box::new(Error::Syntax))
            }
        }
    }
    /// `elif` and `else` may follow the closing brace on the same or a later line
    fn parse_if(&mut self,start: usize) -> Result<Stmt,DYNERR> {
        let mut cases = Vec::new();
        let mut else_branch = None;
        loop {
            self.expect_punct("(")?;
            let cond = self.parse_expr(0)?;
            self.expect_punct(")")?;
            let body = self.parse_block()?;
            cases.push((cond,body));
            let save_pos = self.pos;
            let save_end = self.prev_end;
            while matches!(self.peek(),Tok::Newline) {
                self.advance();
            }
            if self.is_keyword("elif") {
                self.advance();
                continue;
            }
            if self.is_keyword("else") {
                self.advance();
                else_branch = Some(self.parse_block()?);
                break;
            }
            self.pos = save_pos;
            self.prev_end = save_end;
            break;
        }
        Ok(Stmt::If(StmtIfElse { cases, else_branch, loc: self.loc_from(start) }))
    }
    fn loc_from(&self,start: usize) -> Loc {
        Loc { start, end: self.prev_end }
    }
    fn parse_expr(&mut self,min_prec: u8) -> Result<Expr,DYNERR> {
        let mut left = self.parse_unary()?;
        let mut depth = self.expr_depth;
        loop {
            let op = match self.peek() {
                Tok::Punct(p) => p.clone(),
                _ => break
            };
            let prec = match binary_precedence(&op) {
                Some(p) if p >= min_prec => p,
                _ => break
            };
            self.advance();
            let right = self.parse_expr(prec + 1)?;
            depth = usize::max(depth,self.expr_depth) + 1;
            self.set_expr_depth(depth)?;
            let loc = Loc { start: left.loc().start, end: right.loc().end };
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), loc };
        }
        Ok(left)
    }
    fn parse_unary(&mut self) -> Result<Expr,DYNERR> {
        if self.is_punct("-") || self.is_punct("~") || self.is_punct("!") {
            let tok = self.advance();
            let op = match tok.tok {
                Tok::Punct(p) => p,
                _ => return Err(Box::new(Error::Syntax))
            };
            self.nest()?;
            let expr = self.parse_unary()?;
            self.unnest();
            self.set_expr_depth(self.expr_depth + 1)?;
            let loc = Loc { start: tok.start, end: expr.loc().end };
            return Ok(Expr::Unary { op, expr: Box::new(expr), loc });
        }
        self.parse_postfix()
    }
    fn parse_postfix(&mut self) -> Result<Expr,DYNERR> {
        let mut ans = self.parse_primary()?;
        loop {
            if self.is_punct("(") {
                self.advance();
                let mut depth = self.expr_depth;
                let mut args = Vec::new();
                self.nest()?;
                if !self.is_punct(")") {
                    args.push(self.parse_expr(0)?);
                    depth = usize::max(depth,self.expr_depth);
                    while self.is_punct(",") {
                        self.advance();
                        args.push(self.parse_expr(0)?);
                        depth = usize::max(depth,self.expr_depth);
                    }
                }
                self.unnest();
                self.set_expr_depth(depth + 1)?;
                let rparen = self.expect_punct(")")?;
                let loc = Loc { start: ans.loc().start, end: rparen.end };
                ans = Expr::CallFunc { callee: Box::new(ans), args, loc };
            } else if self.is_punct(".") {
                self.advance();
                let member = self.expect_ident()?;
                self.set_expr_depth(self.expr_depth + 1)?;
                let loc = Loc { start: ans.loc().start, end: member.loc.end };
                ans = Expr::Binary { op: ".".to_string(), left: Box::new(ans), right: Box::new(Expr::Ident(member)), loc };
            } else {
                return Ok(ans);
            }
        }
    }
    fn parse_primary(&mut self) -> Result<Expr,DYNERR> {
        let tok = self.advance();
        let loc = Loc { start: tok.start, end: tok.end };
        self.expr_depth = 1;
        match tok.tok {
            Tok::Number(n) => Ok(Expr::Literal { value: LiteralValue::Number(n), loc }),
            Tok::Str(s) => Ok(Expr::Literal { value: LiteralValue::Str(s), loc }),
            Tok::Punct(p) if p=="*" => Ok(Expr::GetCurPc { loc }),
            Tok::Punct(p) if p=="(" => {
                self.nest()?;
                let ans = self.parse_expr(0)?;
                self.unnest();
                self.expect_punct(")")?;
                Ok(ans)
            },
            Tok::Punct(p) if p=="::" => {
                let first = self.expect_ident()?;
                self.parse_path(first.name,tok.start,true)
            },
            Tok::Ident(name) => {
                if super::is_register(&name) && !self.is_punct("::") {
                    return Ok(Expr::Register { value: name, loc });
                }
                self.parse_path(name,tok.start,false)
            },
            _ => {
                log::debug!("expected expression at offset {}",tok.start);
                Err(Box::new(Error::Syntax))
            }
        }
    }
    fn parse_path(&mut self,first: String,start: usize,absolute: bool) -> Result<Expr,DYNERR> {
        let mut path = vec![first];
        while self.is_punct("::") && matches!(self.peek_at(1),Tok::Ident(_)) {
            self.advance();
            path.push(self.expect_ident()?.name);
        }
        Ok(Expr::QualifiedIdent { path, absolute, loc: self.loc_from(start) })
    }
}
