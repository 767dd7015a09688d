//! # Line tokenizer
//!
//! Splits a single line into label, mnemonic, operands and comment without parsing it.
//! The line may be incomplete, as it usually is while it is being typed, so nothing here fails.
//! Columns are byte offsets into the line.
//!
//! Operands are separated by commas at the top level.  Commas and spaces inside parentheses
//! or quotes do not count, and macro parameters such as `\1`, `\@` or `\<name>` are opaque.
//! An operand ends at whitespace.  A top level `;` starts the comment, without one whatever
//! follows the operands is a comment by position.

use once_cell::sync::Lazy;
use regex::Regex;
use super::handbook;
use super::RCH;

static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^((?:[\w.]|\\(?:\d|@|<\w+>))+):[ \t]*").expect(RCH));
static MNEMONIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:!\w*|(?:\\(?:<\w*>|\S)|[^\s;\\])+)").expect(RCH));
static SIG_MNEMONIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s\[]+").expect(RCH));

#[derive(Clone,Debug,PartialEq)]
pub struct Component {
    pub start: usize,
    pub end: usize,
    pub value: String
}

#[derive(Clone,Debug,PartialEq,Default)]
pub struct TokenizedLine {
    pub label: Option<Component>,
    pub mnemonic: Option<Component>,
    /// `None` if there are no operands at all
    pub operands: Option<Vec<Component>>,
    pub comment: Option<Component>
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub enum ComponentType {
    Label,
    Mnemonic,
    Operand,
    Comment
}

#[derive(Clone,Debug,PartialEq)]
pub struct ComponentInfo {
    pub component: Component,
    pub typ: ComponentType,
    /// position in the operand list, only for operands
    pub index: Option<usize>
}

impl Component {
    fn new(line: &str,start: usize,end: usize) -> Self {
        Self {
            start,
            end,
            value: line[start..end].to_string()
        }
    }
    /// both ends count as inside
    pub fn contains(&self,col: usize) -> bool {
        self.start <= col && col <= self.end
    }
}

fn skip_whitespace(line: &str,pos: usize) -> usize {
    match line[pos..].find(|c: char| !c.is_whitespace()) {
        Some(i) => pos + i,
        None => line.len()
    }
}

/// End of the macro parameter that starts with the backslash at `pos`
fn skip_macro_param(line: &str,pos: usize) -> usize {
    let rest = &line[pos+1..];
    if rest.starts_with('<') {
        if let Some(i) = rest.find('>') {
            return pos + 1 + i + 1;
        }
    }
    match rest.chars().next() {
        Some(c) => pos + 1 + c.len_utf8(),
        None => line.len()
    }
}

/// End of the operand starting at `start`, operands never extend past `limit`
fn scan_operand(line: &str,start: usize,limit: usize) -> usize {
    let mut pos = start;
    // a leading `<...>` groups macro arguments
    if line[pos..limit].starts_with('<') {
        if let Some(i) = line[pos..limit].find('>') {
            pos += i + 1;
        }
    }
    let mut depth = 0;
    let mut quote: Option<char> = None;
    while pos < limit {
        let c = match line[pos..].chars().next() {
            Some(c) => c,
            None => break
        };
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            pos += c.len_utf8();
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '\\' => {
                pos = usize::min(skip_macro_param(line,pos),limit);
                continue;
            },
            '(' => depth += 1,
            ')' => depth = usize::saturating_sub(depth,1),
            ',' | ';' if depth == 0 => break,
            c if c.is_whitespace() && depth == 0 => break,
            _ => {}
        }
        pos += c.len_utf8();
    }
    if quote.is_some() {
        return limit;
    }
    pos
}

/// Offset of the first `;` at the top level, quotes, parentheses and macro parameters are skipped
fn find_semicolon(line: &str,start: usize,limit: usize) -> Option<usize> {
    let mut pos = start;
    let mut depth = 0;
    let mut quote: Option<char> = None;
    while pos < limit {
        let c = line[pos..].chars().next()?;
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            pos += c.len_utf8();
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '\\' => {
                pos = skip_macro_param(line,pos);
                continue;
            },
            '(' => depth += 1,
            ')' => depth = usize::saturating_sub(depth,1),
            ';' if depth == 0 => return Some(pos),
            _ => {}
        }
        pos += c.len_utf8();
    }
    None
}

/// Comment for the rest of the line.  It starts at a `;` if there is one,
/// otherwise the leftover text is a comment by position.
fn trailing_comment(line: &str,pos: usize,limit: usize) -> Component {
    match find_semicolon(line,pos,limit) {
        Some(semi) => Component::new(line,semi,limit),
        None => Component::new(line,pos,limit)
    }
}

/// Split one line of source into its components
pub fn parse_line(line: &str) -> TokenizedLine {
    let mut ans = TokenizedLine::default();
    let limit = line.trim_end().len();
    let mut pos = skip_whitespace(line,0);
    if pos >= limit {
        return ans;
    }
    if let Some(caps) = LABEL.captures(&line[pos..]) {
        let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let name = caps.get(1).map(|m| m.end()).unwrap_or(0);
        // `a::b` is a qualified name, not a label
        if !line[pos+name+1..].starts_with(':') {
            ans.label = Some(Component::new(line,pos,pos+name));
            pos += whole;
        }
    }
    pos = skip_whitespace(line,pos);
    if pos >= limit {
        return ans;
    }
    if line[pos..].starts_with(';') {
        ans.comment = Some(Component::new(line,pos,limit));
        return ans;
    }
    let mnemonic = match MNEMONIC.find(&line[pos..]) {
        Some(m) => Component::new(line,pos,pos+m.end()),
        None => {
            ans.comment = Some(Component::new(line,pos,limit));
            return ans;
        }
    };
    pos = mnemonic.end;
    let expects_operands = handbook::operand_count(&mnemonic.value) != Some(0);
    ans.mnemonic = Some(mnemonic);
    pos = skip_whitespace(line,pos);
    if pos >= limit {
        return ans;
    }
    if line[pos..].starts_with(';') || !expects_operands {
        ans.comment = Some(trailing_comment(line,pos,limit));
        return ans;
    }
    let mut operands = Vec::new();
    loop {
        let end = scan_operand(line,pos,limit);
        operands.push(Component::new(line,pos,end));
        pos = end;
        if pos < limit && line[pos..].starts_with(',') {
            pos = skip_whitespace(line,pos + 1);
            if pos >= limit {
                // the user is about to type the next operand
                operands.push(Component::new(line,limit,limit));
                break;
            }
            continue;
        }
        break;
    }
    ans.operands = Some(operands);
    pos = skip_whitespace(line,pos);
    if pos < limit {
        ans.comment = Some(trailing_comment(line,pos,limit));
    }
    ans
}

/// Find the component that contains the column, both ends of a component count as inside
pub fn component_at_index(line: &TokenizedLine,col: usize) -> Option<ComponentInfo> {
    let info = |c: &Component,typ: ComponentType,index: Option<usize>| ComponentInfo {
        component: c.clone(),
        typ,
        index
    };
    if let Some(c) = &line.label {
        if c.contains(col) {
            return Some(info(c,ComponentType::Label,None));
        }
    }
    if let Some(c) = &line.mnemonic {
        if c.contains(col) {
            return Some(info(c,ComponentType::Mnemonic,None));
        }
    }
    if let Some(ops) = &line.operands {
        for (i,c) in ops.iter().enumerate() {
            if c.contains(col) {
                return Some(info(c,ComponentType::Operand,Some(i)));
            }
        }
    }
    if let Some(c) = &line.comment {
        if c.contains(col) {
            return Some(info(c,ComponentType::Comment,None));
        }
    }
    None
}

/// Trimmed component for `sig[start..end]`, `None` if nothing is left
fn trimmed_component(sig: &str,start: usize,end: usize) -> Option<Component> {
    let raw = &sig[start..end];
    let lead = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    match trimmed.is_empty() {
        true => None,
        false => Some(Component::new(sig,start + lead,start + lead + trimmed.len()))
    }
}

/// Split a documented syntax such as `mov <dst:Dr>,<src:Dr>` or `!byte <value>[,<value>]`.
/// A bracketed qualifier right after the mnemonic is skipped, optional operands in brackets are
/// reported without the brackets.
pub fn parse_signature(sig: &str) -> TokenizedLine {
    let mut ans = TokenizedLine::default();
    let mut pos = skip_whitespace(sig,0);
    let mnemonic = match SIG_MNEMONIC.find(&sig[pos..]) {
        Some(m) => Component::new(sig,pos,pos+m.end()),
        None => return ans
    };
    pos = mnemonic.end;
    ans.mnemonic = Some(mnemonic);
    if sig[pos..].starts_with('[') {
        if let Some(i) = sig[pos..].find(']') {
            pos += i + 1;
        }
    }
    pos = skip_whitespace(sig,pos);
    let mut operands = Vec::new();
    let mut start = pos;
    let mut depth = 0;
    for (i,c) in sig[pos..].char_indices() {
        let curr = pos + i;
        match c {
            '(' => depth += 1,
            ')' => depth = usize::saturating_sub(depth,1),
            ',' | '[' | ']' if depth == 0 => {
                operands.extend(trimmed_component(sig,start,curr));
                start = curr + 1;
            },
            _ => {}
        }
    }
    operands.extend(trimmed_component(sig,start,sig.len()));
    if !operands.is_empty() {
        ans.operands = Some(operands);
    }
    ans
}
