use super::super::tokenizer::*;
use super::super::handbook;

fn c(start: usize,end: usize,value: &str) -> Component {
    Component { start, end, value: value.to_string() }
}

fn line(label: Option<Component>,mnemonic: Option<Component>,operands: Option<Vec<Component>>,comment: Option<Component>) -> TokenizedLine {
    TokenizedLine { label, mnemonic, operands, comment }
}

mod parse_line {
    use super::*;
    #[test]
    fn complete_instruction() {
        assert_eq!(parse_line("label:    mov     #1,10(a0,d1,w)    ; comment here"),line(
            Some(c(0,5,"label")),
            Some(c(10,13,"mov")),
            Some(vec![c(18,20,"#1"),c(21,32,"10(a0,d1,w)")]),
            Some(c(36,50,"; comment here"))
        ));
    }
    #[test]
    fn complete_directive() {
        assert_eq!(parse_line("label:    !byte     10, 0xfe, 01010101b    ; comment here"),line(
            Some(c(0,5,"label")),
            Some(c(10,15,"!byte")),
            Some(vec![c(20,22,"10"),c(24,28,"0xfe"),c(30,39,"01010101b")]),
            Some(c(43,57,"; comment here"))
        ));
    }
    #[test]
    fn condensed_instruction() {
        assert_eq!(parse_line("label: mov #1,10(a0,d1,w) ; comment here"),line(
            Some(c(0,5,"label")),
            Some(c(7,10,"mov")),
            Some(vec![c(11,13,"#1"),c(14,25,"10(a0,d1,w)")]),
            Some(c(26,40,"; comment here"))
        ));
    }
    #[test]
    fn condensed_directive() {
        assert_eq!(parse_line("label: !word 0xfedc  ; comment here"),line(
            Some(c(0,5,"label")),
            Some(c(7,12,"!word")),
            Some(vec![c(13,19,"0xfedc")]),
            Some(c(21,35,"; comment here"))
        ));
    }
    #[test]
    fn labels_only() {
        assert_eq!(parse_line("label:"),line(Some(c(0,5,"label")),None,None,None));
        assert_eq!(parse_line("_label:"),line(Some(c(0,6,"_label")),None,None,None));
        assert_eq!(parse_line("   label:"),line(Some(c(3,8,"label")),None,None,None));
    }
    #[test]
    fn label_without_whitespace() {
        assert_eq!(parse_line("label:rts"),line(Some(c(0,5,"label")),Some(c(6,9,"rts")),None,None));
        assert_eq!(parse_line("label:!word"),line(Some(c(0,5,"label")),Some(c(6,11,"!word")),None,None));
    }
    #[test]
    fn qualified_name_is_not_a_label() {
        let tokens = parse_line("scp::start");
        assert_eq!(tokens.label,None);
        assert_eq!(tokens.mnemonic,Some(c(0,10,"scp::start")));
    }
    #[test]
    fn no_label() {
        assert_eq!(parse_line("     mov #1,10(a0,d1,w) ; comment here"),line(
            None,
            Some(c(5,8,"mov")),
            Some(vec![c(9,11,"#1"),c(12,23,"10(a0,d1,w)")]),
            Some(c(24,38,"; comment here"))
        ));
        assert_eq!(parse_line("mov a,b ; comment here"),line(
            None,
            Some(c(0,3,"mov")),
            Some(vec![c(4,5,"a"),c(6,7,"b")]),
            Some(c(8,22,"; comment here"))
        ));
        assert_eq!(parse_line("     !fill 10,0xfe ; comment here"),line(
            None,
            Some(c(5,10,"!fill")),
            Some(vec![c(11,13,"10"),c(14,18,"0xfe")]),
            Some(c(19,33,"; comment here"))
        ));
        assert_eq!(parse_line("!fill 10,0xfe ; comment here"),line(
            None,
            Some(c(0,5,"!fill")),
            Some(vec![c(6,8,"10"),c(9,13,"0xfe")]),
            Some(c(14,28,"; comment here"))
        ));
    }
    #[test]
    fn no_operands() {
        assert_eq!(parse_line("     jmp ; comment here"),line(None,Some(c(5,8,"jmp")),None,Some(c(9,23,"; comment here"))));
        assert_eq!(parse_line("     !byte ; comment here"),line(None,Some(c(5,10,"!byte")),None,Some(c(11,25,"; comment here"))));
        assert_eq!(parse_line(" !byte ; comment here"),line(None,Some(c(1,6,"!byte")),None,Some(c(7,21,"; comment here"))));
    }
    #[test]
    fn comment_by_position() {
        assert_eq!(parse_line("label: mov #1,10(a0,d1.w) comment here"),line(
            Some(c(0,5,"label")),
            Some(c(7,10,"mov")),
            Some(vec![c(11,13,"#1"),c(14,25,"10(a0,d1.w)")]),
            Some(c(26,38,"comment here"))
        ));
        assert_eq!(parse_line(" rts comment here"),line(None,Some(c(1,4,"rts")),None,Some(c(5,17,"comment here"))));
        assert_eq!(parse_line(" !word comment here"),line(
            None,
            Some(c(1,6,"!word")),
            Some(vec![c(7,14,"comment")]),
            Some(c(15,19,"here"))
        ));
    }
    #[test]
    fn space_after_comma() {
        assert_eq!(parse_line("label:    mov     #1, 10(a0,d1,w)    ; comment here"),line(
            Some(c(0,5,"label")),
            Some(c(10,13,"mov")),
            Some(vec![c(18,20,"#1"),c(22,33,"10(a0,d1,w)")]),
            Some(c(37,51,"; comment here"))
        ));
    }
    #[test]
    fn empty_lines() {
        assert_eq!(parse_line(""),TokenizedLine::default());
        assert_eq!(parse_line("  "),TokenizedLine::default());
    }
    #[test]
    fn incomplete_operand_list() {
        assert_eq!(parse_line(" mov d0,"),line(None,Some(c(1,4,"mov")),Some(vec![c(5,7,"d0"),c(8,8,"")]),None));
    }
    #[test]
    fn quoted_operands() {
        assert_eq!(parse_line(" !byte \"foo bar baz\" ; comment"),line(
            None,
            Some(c(1,6,"!byte")),
            Some(vec![c(7,20,"\"foo bar baz\"")]),
            Some(c(21,30,"; comment"))
        ));
        assert_eq!(parse_line(" !word 'foo bar baz' ; comment"),line(
            None,
            Some(c(1,6,"!word")),
            Some(vec![c(7,20,"'foo bar baz'")]),
            Some(c(21,30,"; comment"))
        ));
        assert_eq!(parse_line(" !byte 'foo bar baz"),line(None,Some(c(1,6,"!byte")),Some(vec![c(7,19,"'foo bar baz")]),None));
    }
    #[test]
    fn macro_parameters() {
        assert_eq!(parse_line("foo\\1bar: rts"),line(Some(c(0,8,"foo\\1bar")),Some(c(10,13,"rts")),None,None));
        assert_eq!(parse_line("foo\\@bar: rts"),line(Some(c(0,8,"foo\\@bar")),Some(c(10,13,"rts")),None,None));
        assert_eq!(parse_line("foo\\<reptn>bar: rts"),line(Some(c(0,14,"foo\\<reptn>bar")),Some(c(16,19,"rts")),None,None));
        assert_eq!(parse_line(" b\\1 d0,d1"),line(None,Some(c(1,4,"b\\1")),Some(vec![c(5,7,"d0"),c(8,10,"d1")]),None));
        assert_eq!(parse_line(" mov \\1,d0"),line(None,Some(c(1,4,"mov")),Some(vec![c(5,7,"\\1"),c(8,10,"d0")]),None));
        assert_eq!(parse_line("    FOO     <1,\"foo\">,d2"),line(
            None,
            Some(c(4,7,"FOO")),
            Some(vec![c(12,21,"<1,\"foo\">"),c(22,24,"d2")]),
            None
        ));
    }
    #[test]
    fn nested_parens() {
        assert_eq!(parse_line(" dc\tddfstop,(DIW_XSTRT-17+(DIW_W>>4-1)<<4)>>1&$fc-SCROLL*8"),line(
            None,
            Some(c(1,3,"dc")),
            Some(vec![c(4,11,"ddfstop"),c(12,58,"(DIW_XSTRT-17+(DIW_W>>4-1)<<4)>>1&$fc-SCROLL*8")]),
            None
        ));
    }
}

mod comments {
    use super::*;
    #[test]
    fn semicolon_starts_the_comment() {
        assert_eq!(parse_line("!let k = 5 ; doc"),line(None,Some(c(0,4,"!let")),Some(vec![c(5,6,"k")]),Some(c(11,16,"; doc"))));
        assert_eq!(parse_line("ldi a, 1 + 2 ; c"),line(
            None,
            Some(c(0,3,"ldi")),
            Some(vec![c(4,5,"a"),c(7,8,"1")]),
            Some(c(13,16,"; c"))
        ));
        assert_eq!(parse_line(" rts now ; done"),line(None,Some(c(1,4,"rts")),None,Some(c(9,15,"; done"))));
    }
    #[test]
    fn quoted_semicolon() {
        assert_eq!(parse_line(" !byte \"a;b\" x ; c").comment,Some(c(15,18,"; c")));
        assert_eq!(parse_line(" !byte (';') x").comment,Some(c(13,14,"x")));
    }
    #[test]
    fn position_without_semicolon() {
        assert_eq!(parse_line("!let k = 5").comment,Some(c(7,10,"= 5")));
    }
}

/// Lines in which every character is part of a component or a separator
const FIXTURES: &[&str] = &[
    "label:    mov     #1,10(a0,d1,w)    ; comment here",
    "label:    !byte     10, 0xfe, 01010101b    ; comment here",
    "label: mov #1,10(a0,d1,w) ; comment here",
    "label: !word 0xfedc  ; comment here",
    "label:",
    "_label:",
    "   label:",
    "label:rts",
    "label:!word",
    "scp::start",
    "     mov #1,10(a0,d1,w) ; comment here",
    "mov a,b ; comment here",
    "     !fill 10,0xfe ; comment here",
    "!fill 10,0xfe ; comment here",
    "     jmp ; comment here",
    "     !byte ; comment here",
    " !byte ; comment here",
    "label: mov #1,10(a0,d1.w) comment here",
    " rts comment here",
    " !word comment here",
    "label:    mov     #1, 10(a0,d1,w)    ; comment here",
    "",
    "  ",
    " mov d0,",
    " !byte \"foo bar baz\" ; comment",
    " !word 'foo bar baz' ; comment",
    " !byte 'foo bar baz",
    "foo\\1bar: rts",
    "foo\\@bar: rts",
    "foo\\<reptn>bar: rts",
    " b\\1 d0,d1",
    " mov \\1,d0",
    "    FOO     <1,\"foo\">,d2",
    " dc\tddfstop,(DIW_XSTRT-17+(DIW_W>>4-1)<<4)>>1&$fc-SCROLL*8",
    "label: mov   #1,10(a0,d1,w) ; comment here",
    "ldi a, 1 ; c"
];

mod round_trip {
    use super::*;
    fn components(t: &TokenizedLine) -> Vec<Component> {
        let mut ans = Vec::new();
        ans.extend(t.label.clone());
        ans.extend(t.mnemonic.clone());
        ans.extend(t.operands.clone().unwrap_or_default());
        ans.extend(t.comment.clone());
        ans
    }
    #[test]
    fn components_and_separators_rebuild_the_line() {
        for fixture in FIXTURES {
            let t = parse_line(fixture);
            let mut prev_end = 0;
            let mut after_label = false;
            for comp in components(&t) {
                assert_eq!(comp.value,&fixture[comp.start..comp.end]);
                assert!(comp.start >= prev_end,"overlap in `{}`",fixture);
                let gap = &fixture[prev_end..comp.start];
                let gap = match after_label {
                    true => gap.strip_prefix(':').unwrap_or(gap),
                    false => gap
                };
                assert!(gap.chars().all(|ch| ch.is_whitespace() || ch==','),"`{}` left out of `{}`",gap,fixture);
                after_label = t.label.as_ref()==Some(&comp);
                prev_end = comp.end;
            }
            assert!(fixture[prev_end..].trim().is_empty(),"tail left out of `{}`",fixture);
        }
    }
}

mod component_at_index {
    use super::*;
    fn tokens() -> TokenizedLine {
        parse_line("label: mov   #1,10(a0,d1,w) ; comment here")
    }
    fn info(component: Component,typ: ComponentType,index: Option<usize>) -> Option<ComponentInfo> {
        Some(ComponentInfo { component, typ, index })
    }
    #[test]
    fn each_component() {
        let t = tokens();
        assert_eq!(component_at_index(&t,1),info(c(0,5,"label"),ComponentType::Label,None));
        assert_eq!(component_at_index(&t,8),info(c(7,10,"mov"),ComponentType::Mnemonic,None));
        assert_eq!(component_at_index(&t,14),info(c(13,15,"#1"),ComponentType::Operand,Some(0)));
        assert_eq!(component_at_index(&t,17),info(c(16,27,"10(a0,d1,w)"),ComponentType::Operand,Some(1)));
        assert_eq!(component_at_index(&t,28),info(c(28,42,"; comment here"),ComponentType::Comment,None));
    }
    #[test]
    fn between_components() {
        assert_eq!(component_at_index(&tokens(),12),None);
    }
    #[test]
    fn both_ends_match() {
        let t = tokens();
        assert_eq!(component_at_index(&t,7),info(c(7,10,"mov"),ComponentType::Mnemonic,None));
        assert_eq!(component_at_index(&t,10),info(c(7,10,"mov"),ComponentType::Mnemonic,None));
    }
}

mod parse_signature {
    use super::*;
    #[test]
    fn single_operand() {
        assert_eq!(parse_signature("LSR[.(w)] <ea>").operands,Some(vec![c(10,14,"<ea>")]));
    }
    #[test]
    fn multiple_operands() {
        assert_eq!(parse_signature("MOVE[.(w)] <ea>,<ea>").operands,Some(vec![c(11,15,"<ea>"),c(16,20,"<ea>")]));
    }
    #[test]
    fn optional_operands() {
        assert_eq!(parse_signature("MOVE[.(w)] <ea>[,<ea>]").operands,Some(vec![c(11,15,"<ea>"),c(17,21,"<ea>")]));
    }
    #[test]
    fn handbook_signatures() {
        assert_eq!(parse_signature("add [<dst:a|d>]").operands,Some(vec![c(5,14,"<dst:a|d>")]));
        assert_eq!(parse_signature("mov <dst:Dr>,<src:Dr>").mnemonic,Some(c(0,3,"mov")));
        assert_eq!(parse_signature("rts").operands,None);
        assert_eq!(handbook::operand_count("RTS"),Some(0));
        assert_eq!(handbook::operand_count("mov"),Some(2));
        assert_eq!(handbook::operand_count("!byte"),Some(2));
        assert_eq!(handbook::operand_count("bogus"),None);
        assert_eq!(handbook::operand_placeholder("mov",1),Some("<src:Dr>".to_string()));
        assert_eq!(handbook::operand_placeholder("jmp",0),Some("<label>".to_string()));
        assert_eq!(handbook::operand_placeholder("jmp",1),None);
    }
}
