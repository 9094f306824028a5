//! Statement Builder: groups the lexeme stream into statements.

use string_interner::{DefaultBackend, StringInterner};

use crate::encode::literal_opcodes;
use crate::lex::{Lexeme, Production, Token, TokenKind};
use crate::statement::{InvalidReason, Statement, StatementKind};
use crate::Program;

pub mod shape;

#[cfg(test)]
mod test;

#[derive(Debug, Default)]
struct Builder {
    si: StringInterner<DefaultBackend>,
    statements: Vec<Statement>,
    group: Option<(Production, Vec<Token>)>,
    /// Trivia seen before the first statement.
    leading: Vec<Token>,
}

impl Builder {
    fn push(&mut self, lexeme: Lexeme) {
        match lexeme {
            Lexeme::Open(production) => {
                if let Some(group) = self.group.take() {
                    self.emit(group);
                }
                self.group = Some((production, Vec::new()));
            }
            Lexeme::Close => {
                if let Some(group) = self.group.take() {
                    self.emit(group);
                }
            }
            Lexeme::Token(token) => match &mut self.group {
                Some((_, tokens)) => tokens.push(token),
                None => self.loose(token),
            },
        }
    }

    /// A token outside of any production.
    fn loose(&mut self, token: Token) {
        match token.kind {
            TokenKind::Whitespace => match self.statements.last_mut() {
                Some(last) => last.tokens.push(token),
                None => self.leading.push(token),
            },
            TokenKind::Comment => self.emit((Production::Comment, vec![token])),
            _ => self.emit((Production::Invalid, vec![token])),
        }
    }

    fn emit(&mut self, (production, group): (Production, Vec<Token>)) {
        let mut tokens = std::mem::take(&mut self.leading);
        tokens.extend(group);
        let kind = match production {
            Production::Instruction => match shape::recognize(&tokens, &mut self.si) {
                Some(ins) => StatementKind::Instruction(ins),
                None => malformed(&tokens),
            },
            Production::NumberLiteral => match literal_opcodes(&tokens) {
                Some(ops) if !ops.is_empty() => StatementKind::Number,
                _ => malformed(&tokens),
            },
            Production::Tag => {
                let sig: Vec<&Token> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
                match sig.as_slice() {
                    [name] | [name, Token {
                        kind: TokenKind::TagColon,
                        ..
                    }] if name.kind == TokenKind::TagName => {
                        StatementKind::Tag(self.si.get_or_intern(name.text.to_lowercase()))
                    }
                    _ => malformed(&tokens),
                }
            }
            Production::Comment => StatementKind::Comment,
            Production::Invalid => StatementKind::Invalid(InvalidReason::Upstream),
        };
        self.statements.push(Statement::new(kind, tokens));
    }

    fn finish(mut self) -> Program {
        if let Some(group) = self.group.take() {
            self.emit(group);
        }
        if !self.leading.is_empty() {
            let tokens = std::mem::take(&mut self.leading);
            self.statements
                .push(Statement::new(StatementKind::Comment, tokens));
        }
        tracing::debug!(statements = self.statements.len(), "built statements");
        Program {
            si: self.si,
            statements: self.statements,
            ..Default::default()
        }
    }
}

fn malformed(tokens: &[Token]) -> StatementKind {
    tracing::trace!(?tokens, "malformed production");
    StatementKind::Invalid(InvalidReason::Malformed)
}

/// Groups tokens by the production markers, in source order.
pub fn build(lexemes: impl IntoIterator<Item = Lexeme>) -> Program {
    let mut builder = Builder::default();
    lexemes.into_iter().for_each(|l| builder.push(l));
    builder.finish()
}
