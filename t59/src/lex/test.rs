use expect_test::{expect, Expect};

use super::{Lexeme, Production, Span, Stream, Token, TokenKind};

fn debug_iter<D: std::fmt::Debug>(iter: impl Iterator<Item = D>) -> String {
    iter.map(|s| format!("{s:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check(stream: Stream, expect: Expect) {
    expect.assert_eq(&debug_iter(stream.finish().iter()));
}

#[test]
fn empty() {
    check(Stream::new(), expect![[""]]);
}

#[test]
fn group_spans() {
    check(
        Stream::new().group(
            Production::Instruction,
            &[
                (TokenKind::Instruction, "STO"),
                (TokenKind::IndirectMarker, "Ind"),
                (TokenKind::Digit, "12"),
            ],
        ),
        expect![[r#"
            Open(Instruction)
            Token(Instruction(0, 3) "STO")
            Token(Whitespace(3, 4) " ")
            Token(IndirectMarker(4, 7) "Ind")
            Token(Whitespace(7, 8) " ")
            Token(Digit(8, 10) "12")
            Close"#]],
    );
}

#[test]
fn tokens_between_groups() {
    check(
        Stream::new()
            .group(Production::Comment, &[(TokenKind::Comment, "// hi")])
            .space("\n")
            .open(Production::Tag)
            .token(TokenKind::TagName, "@a")
            .token(TokenKind::TagColon, ":")
            .close(),
        expect![[r#"
            Open(Comment)
            Token(Comment(0, 5) "// hi")
            Close
            Token(Whitespace(5, 6) "\n")
            Open(Tag)
            Token(TagName(6, 8) "@a")
            Token(TagColon(8, 9) ":")
            Close"#]],
    );
}

#[test]
fn digits() {
    let t = |text: &str| Token::new(text, TokenKind::Digit, (0, 0));
    assert_eq!(t("7").digits(2), Some(7));
    assert_eq!(t("07").digits(2), Some(7));
    assert_eq!(t("240").digits(3), Some(240));
    assert_eq!(t("240").digits(2), None);
    assert_eq!(t("").digits(2), None);
    assert_eq!(t("+1").digits(2), None);
}

#[test]
fn span() {
    let src = "GTO 240";
    let span = Span::new(4, 7);
    assert_eq!(span.slice(src), "240");
    assert_eq!(span.len(), 3);
    assert!(Span::new(2, 2).is_empty());
}

#[test]
fn trivia() {
    assert!(TokenKind::Whitespace.is_trivia());
    assert!(TokenKind::Comment.is_trivia());
    assert!(!TokenKind::Digit.is_trivia());
    assert_eq!(
        Lexeme::Token(Token::new("x", TokenKind::Invalid, Span::new(1, 2))),
        Lexeme::Token(Token::new("x", TokenKind::Invalid, (1, 2))),
    );
}
