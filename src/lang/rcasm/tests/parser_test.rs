//! Test of the parser together with the tree adapter.

use super::super::adapter::{self,ParsedProgram};
use super::super::nodes::{NodeKind,NodeValue};

fn parsing(code: &[&str]) -> ParsedProgram {
    super::init_logger();
    adapter::parse(&code.join("\n"))
}

/// kind, offset and length of the node at the offset
fn node_at(program: &ParsedProgram,offset: usize) -> (NodeKind,usize,usize) {
    let id = program.tree.node_at_offset(offset).expect("no node at offset");
    let node = program.tree.get(id);
    (node.kind,node.offset,node.length)
}

fn kinds(program: &ParsedProgram) -> Vec<NodeKind> {
    let mut ans = Vec::new();
    program.tree.accept(&mut |_id,node| {
        ans.push(node.kind);
        true
    });
    ans
}

mod nodes {
    use super::*;
    #[test]
    fn instruction_with_label() {
        let program = parsing(&["start: mov a,b"]);
        assert_eq!(node_at(&program,0),(NodeKind::Label,0,5));
        assert_eq!(node_at(&program,8),(NodeKind::Instruction,7,7));
        assert_eq!(node_at(&program,11),(NodeKind::Register,11,1));
        assert_eq!(node_at(&program,14),(NodeKind::Register,13,1));
        assert_eq!(kinds(&program),vec![
            NodeKind::Program,
            NodeKind::Line,
            NodeKind::Label,
            NodeKind::Instruction,
            NodeKind::Register,
            NodeKind::Register
        ]);
    }
    #[test]
    fn parents_and_values() {
        let program = parsing(&["start: mov a,b"]);
        let id = program.tree.node_at_offset(8).expect("no node");
        let insn = program.tree.get(id);
        assert_eq!(insn.value,Some(NodeValue::Text("mov".to_string())));
        let line = program.tree.get(insn.parent.expect("no parent"));
        assert_eq!(line.kind,NodeKind::Line);
        assert_eq!(line.parent,Some(program.tree.root()));
    }
    #[test]
    fn out_of_range() {
        let program = parsing(&["rts"]);
        assert_eq!(program.tree.node_at_offset(10),None);
        assert_eq!(program.tree.node_path(1).len(),3);
    }
    #[test]
    fn blank_lines_skipped() {
        let program = parsing(&["","  ; just a comment","","rts"]);
        let root = program.tree.get(program.tree.root());
        assert_eq!(root.children.len(),1);
    }
    #[test]
    fn number_formats() {
        let program = parsing(&["!byte 0x10, $20, 0b11, 101b, 12"]);
        let mut values = Vec::new();
        program.tree.accept(&mut |_id,node| {
            if let Some(NodeValue::Number(n)) = &node.value {
                values.push(*n);
            }
            true
        });
        assert_eq!(values,vec![16,32,3,5,12]);
    }
    #[test]
    fn current_pc_and_members() {
        let program = parsing(&["!let here = * + tab.len"]);
        let k = kinds(&program);
        assert!(k.contains(&NodeKind::CurrentPc));
        assert!(k.contains(&NodeKind::Ref));
        assert!(k.contains(&NodeKind::Variable));
    }
    #[test]
    fn not_operator_inside_condition() {
        let program = parsing(&["!if (!flag) {","  rts","}"]);
        let k = kinds(&program);
        assert!(k.contains(&NodeKind::UnaryOp));
        assert!(k.contains(&NodeKind::Instruction));
        let mut directives = Vec::new();
        program.tree.accept(&mut |_id,node| {
            if node.kind==NodeKind::Directive {
                directives.push(node.text().unwrap_or_default().to_string());
            }
            true
        });
        assert_eq!(directives,vec!["!if"]);
    }
    #[test]
    fn set_pc() {
        let program = parsing(&["org 0x100"]);
        assert_eq!(node_at(&program,0),(NodeKind::SetPc,0,9));
    }
}

mod refs {
    use super::*;
    #[test]
    fn qualified_path() {
        let program = parsing(&["jmp ::outer::inner"]);
        let id = program.tree.node_at_offset(8).expect("no node");
        let node = program.tree.get(id);
        assert_eq!(node.kind,NodeKind::SqRef);
        assert_eq!(node.value,Some(NodeValue::Text("::outer::inner".to_string())));
        let sq = node.sq_ref.as_ref().expect("no ref");
        assert_eq!(sq.path,vec!["outer".to_string(),"inner".to_string()]);
        assert!(sq.absolute);
        assert_eq!((node.offset,node.length),(4,14));
    }
    #[test]
    fn split_on_section_sign() {
        let program = parsing(&["fra: inc","ldi m,fra§parr","parr: add"]);
        let fra = program.tree.get(program.tree.node_at_offset(16).expect("no node"));
        assert_eq!(fra.kind,NodeKind::SqRef);
        assert_eq!(program.scopes.find_qualified_symbol(fra.sq_ref.as_ref().expect("no ref")).name(),"fra");
        let parr = program.tree.get(program.tree.node_at_offset(21).expect("no node"));
        assert_eq!(parr.kind,NodeKind::SqRef);
        assert_eq!(program.scopes.find_qualified_symbol(parr.sq_ref.as_ref().expect("no ref")).name(),"parr");
    }
    #[test]
    fn for_variable() {
        let program = parsing(&["!for k in range(16) {","ldi b,k","}"]);
        let k = program.tree.get(program.tree.node_at_offset(28).expect("no node"));
        assert_eq!(k.kind,NodeKind::SqRef);
        let res = program.scopes.find_qualified_symbol(k.sq_ref.as_ref().expect("no ref"));
        assert_eq!(res.name(),"__anon_scope_0::k");
        assert!(res.entry().is_some());
    }
    #[test]
    fn let_variable() {
        let program = parsing(&["!let CPLAN_SIZE = 4","ldi a,CPLAN_SIZE"]);
        let node = program.tree.get(program.tree.node_at_offset(27).expect("no node"));
        let res = program.scopes.find_qualified_symbol(node.sq_ref.as_ref().expect("no ref"));
        assert_eq!(res.name(),"CPLAN_SIZE");
    }
}

mod failures {
    use super::*;
    fn assert_empty(program: &ParsedProgram) {
        assert_eq!(program.tree.len(),1);
        let root = program.tree.get(program.tree.root());
        assert_eq!((root.kind,root.offset,root.length),(NodeKind::Program,0,0));
        assert_eq!(program.scopes.len(),1);
    }
    #[test]
    fn syntax_error() {
        assert_empty(&parsing(&["start: mov a,,b"]));
    }
    #[test]
    fn unknown_directive() {
        assert_empty(&parsing(&["!bogus 1"]));
    }
    #[test]
    fn unterminated_string() {
        assert_empty(&parsing(&["!error \"oops"]));
    }
    #[test]
    fn unbalanced_block() {
        assert_empty(&parsing(&["rts","}"]));
        assert_empty(&parsing(&["scp: {","rts"]));
    }
    #[test]
    fn nesting_too_deep() {
        let parens = format!("!byte {}1{}","(".repeat(3000),")".repeat(3000));
        assert_empty(&parsing(&[parens.as_str()]));
        let negations = format!("!byte {}1","-".repeat(3000));
        assert_empty(&parsing(&[negations.as_str()]));
        let calls = format!("!byte {}1{}","f(".repeat(3000),")".repeat(3000));
        assert_empty(&parsing(&[calls.as_str()]));
        let sum = format!("!byte 1{}","+1".repeat(5000));
        assert_empty(&parsing(&[sum.as_str()]));
        let mut blocks = vec!["s: {";3000];
        blocks.extend(vec!["}";3000]);
        assert_empty(&parsing(&blocks));
    }
    #[test]
    fn moderate_nesting() {
        let parens = format!("!byte {}1{}","(".repeat(20),")".repeat(20));
        assert_eq!(kinds(&parsing(&[parens.as_str()])),vec![
            NodeKind::Program,
            NodeKind::Line,
            NodeKind::Directive,
            NodeKind::Literal
        ]);
        let sum = format!("!byte 1{}","+1".repeat(100));
        assert_eq!(parsing(&[sum.as_str()]).tree.len(),3 + 201);
    }
}

mod scopes {
    use super::*;
    use super::super::super::scopes::ScopeId;

    fn child_names(program: &ParsedProgram,id: ScopeId) -> Vec<String> {
        program.scopes.get(id).children().iter().map(|c| program.scopes.get(*c).name.clone()).collect()
    }
    fn symbol_names(program: &ParsedProgram,id: ScopeId) -> Vec<String> {
        program.scopes.get(id).symbols().iter().map(|e| e.name().to_string()).collect()
    }
    #[test]
    fn anonymous_loops_are_fresh() {
        let program = parsing(&["!for i in range(2) {","add","}","!for j in range(2) {","add","}"]);
        assert_eq!(child_names(&program,program.scopes.root()),vec!["__anon_scope_0","__anon_scope_1"]);
    }
    #[test]
    fn named_scope_is_reused() {
        let program = parsing(&["scp: {","a: add","}","scp: {","b: add","}"]);
        let root = program.scopes.root();
        assert_eq!(child_names(&program,root),vec!["scp"]);
        let scp = program.scopes.get(root).get_child("scp").expect("no scope");
        assert_eq!(symbol_names(&program,scp),vec!["a","b"]);
        assert_eq!(program.scopes.len(),2);
    }
    #[test]
    fn unlabeled_branches_are_fresh() {
        let program = parsing(&["!if (1) {","a: add","} elif (2) {","b: inc","} else {","c: add","}","!for i in range(2) {","add","}"]);
        assert_eq!(child_names(&program,program.scopes.root()),vec!["__anon_scope_0","__anon_scope_1","__anon_scope_2","__anon_scope_3"]);
    }
    #[test]
    fn labeled_branches_share_a_scope() {
        let program = parsing(&["chk: !if (1) {","a: add","} elif (2) {","b: inc","} else {","c: add","}"]);
        let root = program.scopes.root();
        assert_eq!(child_names(&program,root),vec!["chk"]);
        assert_eq!(symbol_names(&program,root),vec!["chk"]);
        let chk = program.scopes.get(root).get_child("chk").expect("no scope");
        assert_eq!(symbol_names(&program,chk),vec!["a","b","c"]);
    }
    #[test]
    fn labeled_loop_body() {
        let program = parsing(&["lp: !for i in range(2) {","add","}","!for j in range(2) {","add","}"]);
        let root = program.scopes.root();
        assert_eq!(child_names(&program,root),vec!["lp__n","__anon_scope_0"]);
        let body = program.scopes.get(root).get_child("lp__n").expect("no scope");
        assert_eq!(symbol_names(&program,body),vec!["i"]);
    }
}
