//! Numeric-Literal Coalescer.
//!
//! Keystroke programs spell numbers one key at a time: `1 . 6 +/- EE +/- 1 9`
//! is seven statements for the single literal `-1.6E-19`. This pass folds
//! such runs into one `Number` statement, keeping tokens, opcodes and the
//! address of the first statement of the run.

use crate::keys::{op, OpCode};
use crate::statement::{Statement, StatementKind};
use crate::Program;


const MAX_MANTISSA_DIGITS: u8 = 10;
const MAX_EXPONENT_DIGITS: u8 = 2;

/// What a literal contains so far.
#[derive(Debug, Clone, Copy, Default)]
struct LiteralShape {
    dot: bool,
    exponent: bool,
    mantissa_digits: u8,
    exponent_digits: u8,
    mantissa_sign: bool,
    exponent_sign: bool,
}

impl LiteralShape {
    fn accept(&mut self, opcodes: &[OpCode]) -> bool {
        for &code in opcodes {
            match code {
                0..=9 if self.exponent => {
                    self.exponent_digits += 1;
                    if self.exponent_digits > MAX_EXPONENT_DIGITS {
                        return false;
                    }
                }
                0..=9 => {
                    self.mantissa_digits += 1;
                    if self.mantissa_digits > MAX_MANTISSA_DIGITS {
                        return false;
                    }
                }
                op::DOT if self.dot => return false,
                op::DOT => self.dot = true,
                op::EE if self.exponent => return false,
                op::EE => self.exponent = true,
                op::SIGN if self.exponent => {
                    if std::mem::replace(&mut self.exponent_sign, true) {
                        return false;
                    }
                }
                op::SIGN => {
                    if std::mem::replace(&mut self.mantissa_sign, true) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

fn is_literal_key(code: OpCode) -> bool {
    matches!(code, 0..=9 | op::DOT | op::SIGN | op::EE)
}

struct Run {
    head: Statement,
    shape: LiteralShape,
    /// Comments passed over since the last statement joined the run.
    skipped: Vec<Statement>,
}

impl Run {
    fn start(st: Statement) -> Result<Self, Statement> {
        let starts = match (&st.kind, &st.opcodes[..]) {
            (StatementKind::Number, _) => true,
            (StatementKind::Instruction(_), &[code]) => code <= 9 || code == op::DOT,
            _ => false,
        };
        let mut shape = LiteralShape::default();
        if starts && shape.accept(&st.opcodes) {
            Ok(Self {
                head: st,
                shape,
                skipped: Vec::new(),
            })
        } else {
            Err(st)
        }
    }

    fn extend(&mut self, st: Statement) -> Result<(), Statement> {
        let fits = match (&st.kind, &st.opcodes[..]) {
            (StatementKind::Number, _) => true,
            (StatementKind::Instruction(_), &[code]) => is_literal_key(code),
            _ => false,
        };
        let mut shape = self.shape;
        if !fits || !shape.accept(&st.opcodes) {
            return Err(st);
        }
        self.shape = shape;
        if !matches!(self.head.kind, StatementKind::Number) {
            tracing::trace!(address = self.head.address, "instruction becomes literal");
            self.head.kind = StatementKind::Number;
        }
        // comments in between move into the literal to keep the token order
        for comment in self.skipped.drain(..) {
            self.head.tokens.extend(comment.tokens);
        }
        self.head.tokens.extend(st.tokens);
        self.head.opcodes.extend(st.opcodes);
        Ok(())
    }

    fn flush(self, out: &mut Vec<Statement>) {
        out.push(self.head);
        out.extend(self.skipped);
    }
}

/// Folds runs of literal keys and literals into single literals.
pub fn coalesce(program: &mut Program) {
    let statements = std::mem::take(&mut program.statements);
    let before = statements.len();
    let mut out = Vec::with_capacity(before);
    let mut run: Option<Run> = None;

    for st in statements {
        let st = match run.as_mut() {
            Some(r) if st.is_comment() => {
                r.skipped.push(st);
                continue;
            }
            Some(r) => match r.extend(st) {
                Ok(()) => continue,
                Err(st) => st,
            },
            None => st,
        };
        if let Some(r) = run.take() {
            r.flush(&mut out);
        }
        match Run::start(st) {
            Ok(r) => run = Some(r),
            Err(st) => out.push(st),
        }
    }
    if let Some(r) = run {
        r.flush(&mut out);
    }

    tracing::debug!(before, after = out.len(), "coalesced literals");
    program.statements = out;
}
