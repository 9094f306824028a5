//! Classified lexemes handed over by the host's scanner and parser.
//!
//! Scanning and grammar analysis happen upstream: every token arrives with its
//! category, and `Open`/`Close` markers delimit the grammar productions.

#[cfg(test)]
mod test;

#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    // NOTE: 'from' must come before 'to' for proper ordering
    pub from: u32,
    pub to: u32,
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

impl Span {
    pub fn slice(self, src: &str) -> &str {
        &src[self.from as usize..self.to as usize]
    }
    pub fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }
    pub fn len(&self) -> u32 {
        self.to - self.from
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait Spanned {
    fn spanned(self) -> Span;
}
impl Spanned for Span {
    fn spanned(self) -> Span {
        self
    }
}
impl Spanned for (u32, u32) {
    fn spanned(self) -> Span {
        Span::new(self.0, self.1)
    }
}

/// Syntactic category assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A key mnemonic such as `STO`, `x=t` or `+/-`.
    Instruction,
    /// Decimal digits used as a key or an argument.
    Digit,
    Sign,
    Dot,
    ExponentMarker,
    /// `Ind`
    IndirectMarker,
    /// Digits of a direct branch address (`240`, or the halves of `02 40`).
    AddressDigit,
    /// Digits of a numeric label (`Lbl 25`, `GTO 25`).
    LabelDigit,
    /// A key used as a label name (`Lbl A'`, `SBR CLR`).
    LabelMnemonic,
    /// `@name`
    TagName,
    /// The `:` closing a tag declaration.
    TagColon,
    /// A whole numeric literal lexeme such as `-1.6E-19`.
    Number,
    Comment,
    Whitespace,
    Invalid,
}

impl TokenKind {
    /// Tokens that carry no meaning for encoding.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub text: Box<str>,
    pub kind: TokenKind,
    pub span: Span,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?} {:?}", self.kind, self.span, self.text)
    }
}

impl Token {
    pub fn new(text: impl Into<Box<str>>, kind: TokenKind, span: impl Spanned) -> Self {
        Self {
            text: text.into(),
            kind,
            span: span.spanned(),
        }
    }

    /// Value of a token made only of ASCII digits, at most `max_len` of them.
    pub fn digits(&self, max_len: usize) -> Option<u16> {
        let text = &*self.text;
        if text.is_empty() || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }
}

/// Grammar production delimited by a pair of markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Instruction,
    NumberLiteral,
    Tag,
    Comment,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Token(Token),
    Open(Production),
    Close,
}

/// Incremental builder of a lexeme stream, tracking byte offsets.
#[derive(Debug, Default)]
pub struct Stream {
    lexemes: Vec<Lexeme>,
    pos: u32,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, production: Production) -> Self {
        self.lexemes.push(Lexeme::Open(production));
        self
    }

    pub fn close(mut self) -> Self {
        self.lexemes.push(Lexeme::Close);
        self
    }

    pub fn token(mut self, kind: TokenKind, text: &str) -> Self {
        let to = self.pos + text.len() as u32;
        self.lexemes
            .push(Lexeme::Token(Token::new(text, kind, (self.pos, to))));
        self.pos = to;
        self
    }

    pub fn space(self, text: &str) -> Self {
        self.token(TokenKind::Whitespace, text)
    }

    /// A whole production, its tokens separated by single spaces.
    pub fn group(self, production: Production, tokens: &[(TokenKind, &str)]) -> Self {
        let mut this = self.open(production);
        for (i, &(kind, text)) in tokens.iter().enumerate() {
            if i != 0 {
                this = this.space(" ");
            }
            this = this.token(kind, text);
        }
        this.close()
    }

    pub fn finish(self) -> Vec<Lexeme> {
        self.lexemes
    }
}
