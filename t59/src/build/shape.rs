//! Recognition of the instruction shapes from the tokens of one production.

use string_interner::{DefaultBackend, StringInterner};

use crate::keys::{self, op, Key, Syntax};
use crate::lex::{Token, TokenKind};
use crate::statement::{Instruction, Shape, Target, TargetKind, YesNoImplicit};
use crate::Address;

struct Cursor<'a> {
    sig: Vec<(usize, &'a Token)>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<(usize, &'a Token)> {
        self.sig.get(self.pos).copied()
    }
    fn bump(&mut self) -> Option<(usize, &'a Token)> {
        let next = self.peek()?;
        self.pos += 1;
        Some(next)
    }
    fn is_empty(&self) -> bool {
        self.pos >= self.sig.len()
    }
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|(_, t)| t.kind)
    }

    fn key(&mut self) -> Option<&'static Key> {
        let (_, token) = self.bump()?;
        match token.kind {
            TokenKind::Instruction => keys::lookup(&token.text),
            _ => None,
        }
    }

    fn indirect(&mut self) -> YesNoImplicit {
        let is_ind = match self.peek() {
            Some((_, t)) if t.kind == TokenKind::IndirectMarker => true,
            Some((_, t)) if t.kind == TokenKind::Instruction => {
                keys::lookup(&t.text).is_some_and(|k| k.syntax == Syntax::Indirect)
            }
            _ => false,
        };
        if is_ind {
            self.pos += 1;
            YesNoImplicit::Yes
        } else {
            YesNoImplicit::No
        }
    }

    /// 1-2 digit register or argument.
    fn register(&mut self) -> Option<u8> {
        let (_, token) = self.bump()?;
        match token.kind {
            TokenKind::Digit => token.digits(2).map(|d| d as u8),
            _ => None,
        }
    }

    fn label(&mut self) -> Option<u8> {
        let (_, token) = self.bump()?;
        label_of(token)
    }

    fn target(
        &mut self,
        indirect: YesNoImplicit,
        si: &mut StringInterner<DefaultBackend>,
    ) -> Option<Target> {
        let (token, first) = self.peek()?;
        let kind = if indirect != YesNoImplicit::No {
            TargetKind::Register(self.register()?)
        } else {
            self.pos += 1;
            match first.kind {
                TokenKind::AddressDigit => {
                    let high = Address::from(first.digits(3)?);
                    match self.peek() {
                        Some((_, low)) if first.text.len() == 2 && low.kind == TokenKind::AddressDigit => {
                            self.pos += 1;
                            let low = low.digits(2).filter(|_| low.text.len() == 2)?;
                            TargetKind::Address {
                                address: high * 100 + Address::from(low),
                                split: true,
                            }
                        }
                        _ => TargetKind::Address {
                            address: high,
                            split: false,
                        },
                    }
                }
                TokenKind::TagName => TargetKind::Tag(si.get_or_intern(first.text.to_lowercase())),
                _ => TargetKind::Label(label_of(first)?),
            }
        };
        Some(Target { kind, token })
    }
}

fn label_of(token: &Token) -> Option<u8> {
    match token.kind {
        TokenKind::LabelDigit | TokenKind::Digit => token.digits(2).map(|d| d as u8),
        TokenKind::LabelMnemonic | TokenKind::Instruction => keys::lookup(&token.text)
            .filter(|k| k.syntax != Syntax::Indirect && k.ops.len() == 1)
            .map(Key::code),
        _ => None,
    }
}

/// Single-key statements written with a literal category (`5`, `.`, `+/-`).
fn literal_key(token: &Token) -> Option<&'static Key> {
    let code = match token.kind {
        TokenKind::Digit if token.text.len() == 1 => token.digits(1)? as u8,
        TokenKind::Dot => op::DOT,
        TokenKind::Sign => op::SIGN,
        TokenKind::ExponentMarker => op::EE,
        _ => return None,
    };
    keys::by_code(code)
}

/// Classifies the tokens of an instruction production into a shape, or
/// `None` when they form none.
pub fn recognize(tokens: &[Token], si: &mut StringInterner<DefaultBackend>) -> Option<Instruction> {
    let mut cur = Cursor {
        sig: tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .collect(),
        pos: 0,
    };

    if let [(_, token)] = cur.sig[..] {
        if let Some(key) = literal_key(token) {
            return Some(Instruction {
                inverted: YesNoImplicit::No,
                shape: Shape::Atomic { key },
                pending: None,
            });
        }
    }

    let mut inverted = YesNoImplicit::No;
    let mut key = cur.key()?;
    if key.code() == op::INV && !cur.is_empty() {
        inverted = YesNoImplicit::Yes;
        key = cur.key()?;
    }
    if key.is_inverted() {
        if inverted == YesNoImplicit::Yes {
            return None;
        }
        inverted = YesNoImplicit::Implicit;
    }

    let shape = match key.syntax {
        Syntax::Atomic => Shape::Atomic { key },
        Syntax::Indirect => return None,
        // INV Fix and INV SBR stand alone
        Syntax::Argument if inverted == YesNoImplicit::Yes && key.code() == op::FIX && cur.is_empty() => {
            Shape::Atomic { key }
        }
        Syntax::Branch if inverted == YesNoImplicit::Yes && key.code() == op::SBR && cur.is_empty() => {
            Shape::Atomic { key }
        }
        Syntax::Argument => {
            let indirect = cur.indirect();
            let arg = cur.register()?;
            Shape::Argument { key, indirect, arg }
        }
        Syntax::IndirectArgument => Shape::Argument {
            key,
            indirect: YesNoImplicit::Implicit,
            arg: cur.register()?,
        },
        Syntax::Label => {
            if inverted != YesNoImplicit::No {
                return None;
            }
            Shape::Label { label: cur.label()? }
        }
        Syntax::Branch => {
            let indirect = cur.indirect();
            let target = cur.target(indirect, si)?;
            Shape::Branch {
                key,
                indirect,
                target,
            }
        }
        Syntax::IndirectBranch => {
            let indirect = YesNoImplicit::Implicit;
            let target = cur.target(indirect, si)?;
            Shape::Branch {
                key,
                indirect,
                target,
            }
        }
        Syntax::ArgumentBranch => {
            let arg_indirect = cur.indirect();
            let arg = cur.register()?;
            let target_indirect = cur.indirect();
            let target = cur.target(target_indirect, si)?;
            Shape::ArgumentBranch {
                key,
                arg_indirect,
                arg,
                target_indirect,
                target,
            }
        }
    };

    if !cur.is_empty() {
        tracing::trace!(next = ?cur.peek_kind(), "surplus tokens after instruction");
        return None;
    }
    Some(Instruction {
        inverted,
        shape,
        pending: None,
    })
}
