use ahash::AHashMap;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

pub mod build;
pub mod coalesce;
pub mod diag;
pub mod encode;
pub mod keys;
pub mod lex;
pub mod resolve;
pub mod statement;


pub use self::diag::{Diagnostic, DiagnosticKind};
pub use self::lex::{Lexeme, Production, Span, Stream, Token, TokenKind};
pub use self::resolve::{LabelTable, SymbolInfo, TagTable};
pub use self::statement::{Statement, StatementKind};

/// Position of an opcode in program memory.
pub type Address = usize;

#[derive(Debug, Default)]
pub struct Program {
    /// Lower-cased tag names.
    pub si: StringInterner<DefaultBackend>,
    pub statements: Vec<Statement>,
    pub opcode_count: usize,
    /// Valid branch targets, and whether anything branches there.
    pub addresses: AHashMap<Address, bool>,
    pub labels: LabelTable,
    pub tags: TagTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn tag_name(&self, symbol: DefaultSymbol) -> &str {
        self.si.resolve(symbol).unwrap_or_default()
    }

    pub fn is_referenced(&self, address: Address) -> bool {
        self.addresses.get(&address).copied().unwrap_or(false)
    }

    /// The linear program image.
    pub fn opcodes(&self) -> impl Iterator<Item = keys::OpCode> + '_ {
        self.statements.iter().flat_map(|s| s.opcodes.iter().copied())
    }

    /// Concatenation of every token, the text the stream was built from.
    pub fn source(&self) -> String {
        self.statements.iter().map(Statement::source).collect()
    }
}

/// Runs the four passes over one stream of lexemes.
///
/// Never fails: problems end up in `Program::diagnostics` and the program is
/// still fully encoded and addressed.
pub fn assemble(lexemes: impl IntoIterator<Item = Lexeme>) -> Program {
    let mut program = build::build(lexemes);
    encode::encode(&mut program);
    coalesce::coalesce(&mut program);
    resolve::resolve(&mut program);
    tracing::debug!(
        statements = program.statements.len(),
        opcodes = program.opcode_count,
        diagnostics = program.diagnostics.len(),
        "assembled"
    );
    program
}
