//! Text renderings of an assembled [`Program`]: the annotated listing, the
//! label index and the error report.

use std::fmt::Write;

use t59::keys::{self, op, Key, OpCode};
use t59::statement::{Instruction, Shape, Target, TargetKind, YesNoImplicit};
use t59::{Program, Statement, StatementKind, Token, TokenKind};


#[derive(Debug)]
pub struct ListingContext {
    /// default = `6`
    pub ops_per_line: usize,
}

impl Default for ListingContext {
    fn default() -> Self {
        Self { ops_per_line: 6 }
    }
}

struct Lister<'a> {
    program: &'a Program,
    ctx: &'a ListingContext,
    out: String,
}

impl Lister<'_> {
    fn list(mut self) -> Self {
        let program = self.program;
        program.statements.iter().for_each(|st| self.statement(st));
        self
    }

    fn cols(&self) -> usize {
        self.ctx.ops_per_line.max(1)
    }

    fn statement(&mut self, st: &Statement) {
        match st.kind {
            StatementKind::Comment | StatementKind::Tag(_) => self.unaddressed(st, 0),
            StatementKind::Invalid(_) => self.unaddressed(st, 2),
            StatementKind::Instruction(_) | StatementKind::Number => self.addressed(st),
        }
    }

    /// Lines without opcodes start at the text column.
    fn unaddressed(&mut self, st: &Statement, extra: usize) {
        let indent = 3 * self.cols() + 7 + extra;
        let _ = writeln!(self.out, "{:indent$}{}", "", text(st));
    }

    fn addressed(&mut self, st: &Statement) {
        let cols = self.cols();
        let ops = rendered_ops(st);
        let mut chunks = ops.chunks(cols);
        let first = chunks.next().unwrap_or_default();
        let pad = 3 + 3 * (cols - first.len());
        let marker = if st.label().is_some() {
            "■ "
        } else if st.diagnostic.is_some() {
            "? "
        } else if self.program.is_referenced(st.address) {
            "› "
        } else {
            "  "
        };
        let _ = writeln!(
            self.out,
            "{:03}: {}{:pad$}{marker}{}",
            st.address,
            first.join(" "),
            "",
            text(st)
        );
        for (i, chunk) in chunks.enumerate() {
            let address = st.address + (i + 1) * cols;
            let _ = writeln!(self.out, "{address:03}: {}", chunk.join(" "));
        }
    }
}

/// Two-digit opcodes, `??` for the bytes of a tag that never resolved.
fn rendered_ops(st: &Statement) -> Vec<String> {
    let pending = st
        .instruction()
        .and_then(|i| i.pending)
        .map(|p| p.offset..p.offset + 2);
    st.opcodes
        .iter()
        .enumerate()
        .map(|(i, o)| match &pending {
            Some(range) if range.contains(&i) => "??".to_owned(),
            _ => format!("{o:02}"),
        })
        .collect()
}

/// Normalized source text of a statement.
pub fn text(st: &Statement) -> String {
    let joined = |keep: fn(TokenKind) -> bool, sep: &str| {
        st.tokens
            .iter()
            .filter(|t| keep(t.kind))
            .map(|t| &*t.text)
            .collect::<Vec<_>>()
            .join(sep)
    };
    match &st.kind {
        StatementKind::Number => {
            let comments = joined(|k| k == TokenKind::Comment, " ");
            let number = number_text(&st.opcodes);
            if comments.is_empty() {
                number
            } else {
                format!("{number} {comments}")
            }
        }
        StatementKind::Tag(_) => joined(|k| !k.is_trivia(), ""),
        StatementKind::Comment => joined(|k| k == TokenKind::Comment, " "),
        StatementKind::Invalid(_) => joined(|k| k != TokenKind::Whitespace, " "),
        StatementKind::Instruction(ins) => instruction_text(st, ins),
    }
}

/// Canonical key names, so `sto ind 01` reads `ST* 01` and `inv sbr` reads `RTN`.
fn instruction_text(st: &Statement, ins: &Instruction) -> String {
    let mut words = Vec::new();
    if ins.inverted == YesNoImplicit::Yes {
        words.push("INV".to_owned());
    }
    match &ins.shape {
        Shape::Atomic { key } => words.push(key.mnemonic.to_owned()),
        Shape::Argument { key, indirect, arg } => {
            keyed(&mut words, key, *indirect);
            words.push(format!("{arg:02}"));
        }
        Shape::Label { label } => {
            words.push("Lbl".to_owned());
            words.push(label_text(*label, st.significant().last().map(|(_, t)| t)));
        }
        Shape::Branch {
            key,
            indirect,
            target,
        } => {
            keyed(&mut words, key, *indirect);
            words.push(target_text(st, target));
        }
        Shape::ArgumentBranch {
            key,
            arg_indirect,
            arg,
            target_indirect,
            target,
        } => {
            keyed(&mut words, key, *arg_indirect);
            words.push(format!("{arg:02}"));
            if *target_indirect == YesNoImplicit::Yes {
                words.push("Ind".to_owned());
            }
            words.push(target_text(st, target));
        }
    }
    words.join(" ")
}

fn keyed(words: &mut Vec<String>, key: &Key, indirect: YesNoImplicit) {
    match indirect {
        YesNoImplicit::Implicit => {
            let merged = keys::indirect_variant(key.code()).and_then(keys::by_code);
            words.push(merged.unwrap_or(key).mnemonic.to_owned());
        }
        YesNoImplicit::Yes => {
            words.push(key.mnemonic.to_owned());
            words.push("Ind".to_owned());
        }
        YesNoImplicit::No => words.push(key.mnemonic.to_owned()),
    }
}

/// Numeric labels keep two digits, mnemonic ones print the key name.
fn label_text(code: u8, token: Option<&Token>) -> String {
    match token.map(|t| t.kind) {
        Some(TokenKind::LabelMnemonic | TokenKind::Instruction) => keys::by_code(code)
            .map_or_else(|| format!("{code:02}"), |k| k.mnemonic.to_owned()),
        _ => format!("{code:02}"),
    }
}

fn target_text(st: &Statement, target: &Target) -> String {
    match target.kind {
        TargetKind::Address {
            address,
            split: true,
        } => format!("{:02} {:02}", address / 100, address % 100),
        TargetKind::Address { address, .. } => format!("{address:03}"),
        TargetKind::Label(code) => label_text(code, st.tokens.get(target.token)),
        TargetKind::Register(register) => format!("{register:02}"),
        TargetKind::Tag(_) => st
            .tokens
            .get(target.token)
            .map_or_else(String::new, |t| t.text.to_string()),
    }
}

/// A literal as it would be typed, sign first: `1 . 6 +/- EE +/- 1 9`
/// reads `-1.6E-19`.
fn number_text(ops: &[OpCode]) -> String {
    let (mantissa, exponent) = match ops.iter().position(|&o| o == op::EE) {
        Some(i) => (&ops[..i], Some(&ops[i + 1..])),
        None => (ops, None),
    };
    let mut out = String::new();
    number_part(&mut out, mantissa);
    if let Some(exponent) = exponent {
        out.push('E');
        number_part(&mut out, exponent);
    }
    out
}

fn number_part(out: &mut String, ops: &[OpCode]) {
    if ops.iter().filter(|&&o| o == op::SIGN).count() % 2 == 1 {
        out.push('-');
    }
    for &o in ops {
        match o {
            0..=9 => out.push(char::from(b'0' + o)),
            op::DOT => out.push('.'),
            _ => (),
        }
    }
}

/// Listing of every statement with its address, opcodes and a marker:
/// `■` label, `?` diagnostic, `›` branched to.
pub fn listing(program: &Program, ctx: &ListingContext) -> String {
    let out = Lister {
        program,
        ctx,
        out: String::new(),
    }
    .list()
    .out;
    tracing::debug!(
        statements = program.statements.len(),
        bytes = out.len(),
        "rendered listing"
    );
    out
}

/// Label declarations and tags in program order.
pub fn labels(program: &Program) -> String {
    let mut out = String::new();
    for st in &program.statements {
        if st.label().is_some() || matches!(st.kind, StatementKind::Tag(_)) {
            let _ = writeln!(out, "{:03}: {}", st.address, text(st));
        }
    }
    out
}

pub fn errors(program: &Program) -> String {
    let mut out = String::new();
    for d in &program.diagnostics {
        let Some(st) = program.statements.get(d.statement) else {
            continue;
        };
        let _ = writeln!(out, "{:03}: {d}: {}", st.address, text(st));
    }
    out
}
