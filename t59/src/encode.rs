//! Opcode Encoder and program-counter assignment.

use crate::keys::{self, op, OpCode};
use crate::lex::{Token, TokenKind};
use crate::statement::{
    Instruction, PendingTag, Shape, StatementKind, Target, TargetKind, YesNoImplicit,
};
use crate::Program;

#[cfg(test)]
mod test;

/// Opcodes of a numeric literal, `None` if a token is no part of one.
pub fn literal_opcodes(tokens: &[Token]) -> Option<Vec<OpCode>> {
    let mut out = Vec::new();
    for token in tokens.iter().filter(|t| !t.kind.is_trivia()) {
        match token.kind {
            TokenKind::Sign => out.push(op::SIGN),
            TokenKind::Dot => out.push(op::DOT),
            TokenKind::ExponentMarker => out.push(op::EE),
            TokenKind::Number
            | TokenKind::Digit
            | TokenKind::AddressDigit
            | TokenKind::LabelDigit => {
                for c in token.text.chars() {
                    match c {
                        '0'..='9' => out.push(c as u8 - b'0'),
                        '.' => out.push(op::DOT),
                        '-' => out.push(op::SIGN),
                        'e' | 'E' => out.push(op::EE),
                        '+' => (),
                        _ => return None,
                    }
                }
            }
            _ => return None,
        }
    }
    Some(out)
}

#[derive(Debug, Default)]
struct Encoder {
    out: Vec<OpCode>,
}

impl Encoder {
    fn write(&mut self, ops: &[OpCode]) {
        self.out.extend_from_slice(ops);
    }

    /// Base opcode followed by an optional `Ind`, folded into the
    /// indirect variant of the opcode when one exists.
    fn with_indirect(&mut self, code: OpCode, indirect: &mut YesNoImplicit) {
        match (*indirect, keys::indirect_variant(code)) {
            (YesNoImplicit::Yes, Some(merged)) => {
                tracing::trace!(code, merged, "merged Ind");
                self.write(&[merged]);
                *indirect = YesNoImplicit::Implicit;
            }
            (YesNoImplicit::Yes, None) => self.write(&[code, op::IND]),
            _ => self.write(&[code]),
        }
    }

    fn target(&mut self, target: &Target, pending: &mut Option<PendingTag>) {
        match target.kind {
            TargetKind::Address { address, .. } => {
                self.write(&[(address / 100) as OpCode, (address % 100) as OpCode])
            }
            TargetKind::Label(code) | TargetKind::Register(code) => self.write(&[code]),
            TargetKind::Tag(symbol) => {
                *pending = Some(PendingTag {
                    symbol,
                    offset: self.out.len(),
                    token: target.token,
                });
                // patched once the tag is resolved
                self.write(&[0, 0]);
            }
        }
    }

    fn instruction(mut self, ins: &mut Instruction) -> Vec<OpCode> {
        let Instruction {
            inverted,
            shape,
            pending,
        } = ins;

        // INV SBR is the return key, not an inverted call
        if let Shape::Atomic { key } = shape {
            if *inverted == YesNoImplicit::Yes && key.code() == op::SBR {
                if let Some(rtn) = keys::by_code(op::RTN) {
                    *key = rtn;
                    *inverted = YesNoImplicit::No;
                }
            }
        }

        if *inverted == YesNoImplicit::Yes {
            self.write(&[op::INV]);
        }
        match shape {
            Shape::Atomic { key } => self.write(key.ops),
            Shape::Argument { key, indirect, arg } => {
                self.with_indirect(key.code(), indirect);
                self.write(&[*arg]);
            }
            Shape::Label { label } => self.write(&[op::LBL, *label]),
            Shape::Branch {
                key,
                indirect,
                target,
            } => {
                self.with_indirect(key.code(), indirect);
                self.target(target, pending);
            }
            Shape::ArgumentBranch {
                key,
                arg_indirect,
                arg,
                target_indirect,
                target,
            } => {
                self.with_indirect(key.code(), arg_indirect);
                self.write(&[*arg]);
                if *target_indirect == YesNoImplicit::Yes {
                    self.write(&[op::IND]);
                }
                self.target(target, pending);
            }
        }
        self.out
    }
}

/// Expands every statement into opcodes and assigns addresses.
pub fn encode(program: &mut Program) {
    let mut pc = 0usize;
    for st in &mut program.statements {
        st.address = pc;
        st.opcodes = match &mut st.kind {
            StatementKind::Instruction(ins) => Encoder::default().instruction(ins),
            StatementKind::Number => literal_opcodes(&st.tokens).unwrap_or_default(),
            StatementKind::Tag(_) | StatementKind::Comment | StatementKind::Invalid(_) => {
                Vec::new()
            }
        };
        pc += st.opcodes.len();
    }
    program.opcode_count = pc;
    tracing::debug!(opcodes = pc, "encoded program");
}
