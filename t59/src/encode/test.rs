use expect_test::{expect, Expect};

use super::{encode, literal_opcodes};
use crate::build::build;
use crate::lex::{Token, TokenKind};
use crate::statement::{Shape, YesNoImplicit};
use crate::test::lexemes;

fn check(src: &str, expect: Expect) {
    let mut program = build(lexemes(src));
    encode(&mut program);
    let mut output = program
        .statements
        .iter()
        .map(|st| {
            let ops = st
                .opcodes
                .iter()
                .map(|o| format!("{o:02}"))
                .collect::<Vec<_>>()
                .join(" ");
            let pending = match st.instruction().and_then(|i| i.pending) {
                Some(p) => format!(" pending@{}", p.offset),
                None => String::new(),
            };
            format!("{:03}: [{ops}]{pending}\n", st.address)
        })
        .collect::<String>();
    output += &format!("count: {}\n", program.opcode_count);
    expect.assert_eq(&output);
}

#[test]
fn shapes() {
    check(
        "
        INV SBR
        INV log
        10^x
        STO Ind 12
        HIR Ind 05
        GTO Ind 03
        x=t a:240
        Dsz Ind 1 Ind 05
        SBR A'
        Lbl 12
        INV x>=t a:5
        ",
        expect![[r#"
            000: [92]
            001: [22 28]
            003: [22 28]
            005: [72 12]
            007: [82 40 05]
            010: [83 03]
            012: [67 02 40]
            015: [97 40 01 40 05]
            020: [71 16]
            022: [76 12]
            024: [22 77 00 05]
            count: 28
        "#]],
    );
}

#[test]
fn addressing() {
    check(
        "
        // start
        @top:
        !oops
        GTO @top
        #12.5
        RTN
        ",
        expect![[r#"
            000: []
            000: []
            000: []
            000: [61 00 00] pending@1
            003: [01 02 93 05]
            007: [92]
            count: 8
        "#]],
    );
}

#[test]
fn inverse_call_becomes_return() {
    let mut program = build(lexemes("INV SBR"));
    encode(&mut program);
    let ins = program.statements[0].instruction().cloned();
    let ins = ins.expect("instruction");
    assert_eq!(ins.inverted, YesNoImplicit::No);
    assert!(matches!(ins.shape, Shape::Atomic { key } if key.mnemonic == "RTN"));
}

#[test]
fn merged_indirect_is_implicit() {
    let mut program = build(lexemes("Prd Ind 07 ; Op Ind 20 ; If_flg Ind 1 a:100"));
    encode(&mut program);
    let sides: Vec<_> = program
        .statements
        .iter()
        .filter_map(|st| match st.instruction()?.shape {
            Shape::Argument { indirect, .. } => Some((indirect, None)),
            Shape::ArgumentBranch {
                arg_indirect,
                target_indirect,
                ..
            } => Some((arg_indirect, Some(target_indirect))),
            _ => None,
        })
        .collect();
    assert_eq!(
        sides,
        [
            (YesNoImplicit::Implicit, None),
            (YesNoImplicit::Implicit, None),
            (YesNoImplicit::Yes, Some(YesNoImplicit::No)),
        ]
    );
    let ops: Vec<_> = program.statements.iter().map(|s| s.opcodes.clone()).collect();
    assert_eq!(ops, [vec![64, 7], vec![84, 20], vec![87, 40, 1, 1, 0]]);
}

#[test]
fn literals() {
    let t = |kind, text: &str| Token::new(text, kind, (0, 0));
    assert_eq!(
        literal_opcodes(&[t(TokenKind::Number, "-1.6E-19")]),
        Some(vec![94, 1, 93, 6, 52, 94, 1, 9])
    );
    assert_eq!(
        literal_opcodes(&[
            t(TokenKind::Digit, "3"),
            t(TokenKind::Whitespace, " "),
            t(TokenKind::Dot, "."),
            t(TokenKind::Comment, "// pi"),
            t(TokenKind::Number, "1e+4"),
            t(TokenKind::Sign, "+/-"),
        ]),
        Some(vec![3, 93, 1, 52, 4, 94])
    );
    assert_eq!(literal_opcodes(&[t(TokenKind::Number, "1x")]), None);
    assert_eq!(literal_opcodes(&[t(TokenKind::TagName, "@a")]), None);
}
