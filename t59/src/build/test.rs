use expect_test::{expect, Expect};

use super::build;
use crate::lex::{Production, Stream, TokenKind};
use crate::statement::{InvalidReason, Shape, StatementKind, TargetKind};
use crate::test::lexemes;

fn check(src: &str, expect: Expect) {
    let program = build(lexemes(src));
    let output = program
        .statements
        .iter()
        .map(|st| match &st.kind {
            StatementKind::Instruction(ins) => format!("{:?} {:?}\n", ins.inverted, ins.shape),
            StatementKind::Number => format!("Number {:?}\n", st.source().trim()),
            StatementKind::Tag(symbol) => format!("Tag {}\n", program.tag_name(*symbol)),
            StatementKind::Comment => format!("Comment {:?}\n", st.source()),
            StatementKind::Invalid(reason) => format!("Invalid({reason:?})\n"),
        })
        .collect::<String>();
    expect.assert_eq(&output);
}

#[test]
fn atomic() {
    check(
        "CLR ; 5 ; . ; +/- ; EE ; INV ; INV SBR ; INV Fix ; INV log ; e^x",
        expect![[r#"
            No Atomic { key: CLR }
            No Atomic { key: 5 }
            No Atomic { key: . }
            No Atomic { key: +/- }
            No Atomic { key: EE }
            No Atomic { key: INV }
            Yes Atomic { key: SBR }
            Yes Atomic { key: Fix }
            Yes Atomic { key: log }
            Implicit Atomic { key: e^x }
        "#]],
    );
}

#[test]
fn argument() {
    check(
        "STO 12 ; RCL Ind 03 ; RC* 03 ; Fix 2 ; INV St_flg 1",
        expect![[r#"
            No Argument { key: STO, indirect: No, arg: 12 }
            No Argument { key: RCL, indirect: Yes, arg: 3 }
            No Argument { key: RC*, indirect: Implicit, arg: 3 }
            No Argument { key: Fix, indirect: No, arg: 2 }
            Yes Argument { key: St flg, indirect: No, arg: 1 }
        "#]],
    );
}

#[test]
fn label() {
    check(
        "Lbl A' ; Lbl m:CLR ; Lbl l:25 ; Lbl 7",
        expect![[r#"
            No Label { label: 16 }
            No Label { label: 25 }
            No Label { label: 25 }
            No Label { label: 7 }
        "#]],
    );
}

#[test]
fn branch() {
    check(
        "GTO a:240 ; GTO a:02 a:40 ; GTO a:12 a:40 ; SBR l:25 ; x=t E ; GO* 12 ; GTO Ind 12",
        expect![[r#"
            No Branch { key: GTO, indirect: No, target: Target { kind: Address { address: 240, split: false }, token: 2 } }
            No Branch { key: GTO, indirect: No, target: Target { kind: Address { address: 240, split: true }, token: 2 } }
            No Branch { key: GTO, indirect: No, target: Target { kind: Address { address: 1240, split: true }, token: 2 } }
            No Branch { key: SBR, indirect: No, target: Target { kind: Label(25), token: 2 } }
            No Branch { key: x=t, indirect: No, target: Target { kind: Label(15), token: 2 } }
            No Branch { key: GO*, indirect: Implicit, target: Target { kind: Register(12), token: 2 } }
            No Branch { key: GTO, indirect: Yes, target: Target { kind: Register(12), token: 4 } }
        "#]],
    );
}

#[test]
fn argument_branch() {
    check(
        "Dsz 1 a:240 ; If_flg Ind 05 Ind 06 ; INV Dsz 9 l:10",
        expect![[r#"
            No ArgumentBranch { key: Dsz, arg_indirect: No, arg: 1, target_indirect: No, target: Target { kind: Address { address: 240, split: false }, token: 4 } }
            No ArgumentBranch { key: If flg, arg_indirect: Yes, arg: 5, target_indirect: Yes, target: Target { kind: Register(6), token: 8 } }
            Yes ArgumentBranch { key: Dsz, arg_indirect: No, arg: 9, target_indirect: No, target: Target { kind: Label(10), token: 6 } }
        "#]],
    );
}

#[test]
fn malformed() {
    check(
        "STO ; STO 123 ; STO 1 2 ; Frob ; INV e^x ; INV Lbl 12 ; Lbl Ind ; GTO Ind a:12 ; Ind 3",
        expect![[r#"
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
            Invalid(Malformed)
        "#]],
    );
}

#[test]
fn tags_and_numbers() {
    check(
        "@Loop: ; #-1.6E-19 ; !?? ; #",
        expect![[r#"
            Tag @loop
            Number "-1.6E-19"
            Invalid(Upstream)
            Invalid(Malformed)
        "#]],
    );
}

#[test]
fn tag_names_are_case_insensitive() {
    let program = build(lexemes("@Loop: ; GTO @LOOP"));
    let StatementKind::Tag(declared) = program.statements[0].kind else {
        panic!("not a tag")
    };
    let target = program.statements[1]
        .instruction()
        .and_then(|i| i.shape.target())
        .map(|t| t.kind);
    assert_eq!(target, Some(TargetKind::Tag(declared)));
    assert_eq!(program.tag_name(declared), "@loop");
}

#[test]
fn trivia_ownership() {
    let program = build(lexemes(
        "
        // header
        CLR // clear
        RTN
        ",
    ));
    let sources: Vec<_> = program.statements.iter().map(|s| s.source()).collect();
    assert_eq!(
        sources,
        ["\n// header\n", "CLR ", "// clear\n", "RTN\n"]
    );
}

#[test]
fn whitespace_only() {
    let program = build(Stream::new().space("  \n ").finish());
    assert_eq!(program.statements.len(), 1);
    assert!(program.statements[0].is_comment());
    assert!(build(Vec::new()).statements.is_empty());
}

#[test]
fn unbalanced_markers() {
    let lexemes = Stream::new()
        .close()
        .open(Production::Instruction)
        .token(TokenKind::Instruction, "CLR")
        .open(Production::Instruction)
        .token(TokenKind::Instruction, "RTN")
        .token(TokenKind::Digit, "7")
        .finish();
    let program = build(lexemes);
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(
        program.statements[0].instruction().map(|i| &i.shape),
        Some(Shape::Atomic { .. })
    ));
    assert_eq!(
        program.statements[1].kind,
        StatementKind::Invalid(InvalidReason::Malformed)
    );
    assert_eq!(program.source(), "CLRRTN7");
}

#[test]
fn loose_tokens() {
    let lexemes = Stream::new()
        .token(TokenKind::Digit, "4")
        .token(TokenKind::Comment, "; note")
        .finish();
    let kinds: Vec<_> = build(lexemes).statements.into_iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [
            StatementKind::Invalid(InvalidReason::Upstream),
            StatementKind::Comment
        ]
    );
}
