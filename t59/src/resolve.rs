//! Symbol Resolver: label and tag tables, reference checks, tag patching.
//!
//! Three passes over the frozen statement list:
//! 1. tables of labels, tags and valid branch addresses, invalid statements;
//! 2. every branch target checked against them, tag addresses written in;
//! 3. tags nobody branches to.
//!
//! Nothing here aborts: each problem becomes a [`Diagnostic`] and resolution
//! carries on with the next statement.

use ahash::AHashMap;
use string_interner::DefaultSymbol;

use crate::diag::{Diagnostic, DiagnosticKind};
use crate::keys::{op, OpCode};
use crate::statement::{Shape, StatementKind, TargetKind};
use crate::{Address, Program};


/// Declaration of a label or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Index of the declaring statement.
    pub statement: usize,
    pub referenced: bool,
}

const MAX_TARGET: Address = 9999;

pub type LabelTable = AHashMap<u8, SymbolInfo>;
pub type TagTable = AHashMap<DefaultSymbol, SymbolInfo>;

struct Resolver<'a> {
    program: &'a mut Program,
}

impl Resolver<'_> {
    fn report(&mut self, statement: usize, token: Option<usize>, kind: DiagnosticKind) {
        let id = self.program.diagnostics.len();
        let st = &mut self.program.statements[statement];
        tracing::debug!(address = st.address, %kind, "diagnostic");
        st.diagnostic = Some(id);
        self.program.diagnostics.push(Diagnostic {
            kind,
            statement,
            token,
        });
    }

    fn address_of(&self, statement: usize) -> Address {
        self.program.statements[statement].address
    }

    fn mark_referenced(&mut self, address: Address) {
        if let Some(referenced) = self.program.addresses.get_mut(&address) {
            *referenced = true;
        }
    }

    fn valid(&mut self, address: Address) {
        self.program.addresses.entry(address).or_insert(false);
    }

    fn tables(&mut self) {
        for i in 0..self.program.statements.len() {
            let st = &self.program.statements[i];
            let address = st.address;
            match &st.kind {
                StatementKind::Instruction(_) => {
                    let label = st.label();
                    // the step after a leading INV is a valid target too
                    let inv_prefixed = st.opcodes.len() > 1 && st.opcodes[0] == op::INV;
                    self.valid(address);
                    if inv_prefixed {
                        self.valid(address + 1);
                    }
                    if let Some(label) = label {
                        self.declare_label(i, label);
                    }
                }
                StatementKind::Tag(symbol) => {
                    let symbol = *symbol;
                    self.declare_tag(i, symbol);
                }
                StatementKind::Number => {
                    for a in st.addresses() {
                        self.valid(a);
                    }
                }
                StatementKind::Invalid(_) => {
                    self.report(i, None, DiagnosticKind::InvalidStatement);
                }
                StatementKind::Comment => (),
            }
        }
    }

    fn declare_label(&mut self, statement: usize, label: u8) {
        match self.program.labels.get(&label) {
            Some(first) => {
                let kind = DiagnosticKind::DuplicateLabel {
                    label,
                    first: self.address_of(first.statement),
                    second: self.address_of(statement),
                };
                self.report(statement, None, kind);
            }
            None => {
                self.program.labels.insert(
                    label,
                    SymbolInfo {
                        statement,
                        referenced: false,
                    },
                );
            }
        }
    }

    fn declare_tag(&mut self, statement: usize, symbol: DefaultSymbol) {
        match self.program.tags.get(&symbol) {
            Some(first) => {
                let kind = DiagnosticKind::DuplicateTag {
                    first: self.address_of(first.statement),
                    second: self.address_of(statement),
                };
                self.report(statement, None, kind);
            }
            None => {
                self.program.tags.insert(
                    symbol,
                    SymbolInfo {
                        statement,
                        referenced: false,
                    },
                );
            }
        }
    }

    fn references(&mut self) {
        // set by Pgm: the next instruction branches inside another program
        let mut foreign = false;
        for i in 0..self.program.statements.len() {
            let st = &self.program.statements[i];
            let StatementKind::Instruction(ins) = &st.kind else {
                continue;
            };
            if matches!(st.opcodes.first(), Some(&(op::PGM | op::PGM_IND))) {
                foreign = true;
                continue;
            }
            if let Shape::Label { .. } = ins.shape {
                continue;
            }
            let target = ins.shape.target().copied();
            let pending = ins.pending;

            if let Some(target) = target {
                match target.kind {
                    TargetKind::Address { address, .. } if !foreign => {
                        match self.program.addresses.get_mut(&address) {
                            Some(referenced) => *referenced = true,
                            None => self.report(
                                i,
                                Some(target.token),
                                DiagnosticKind::TargetAddressInvalid(address),
                            ),
                        }
                    }
                    TargetKind::Label(label) if !foreign => {
                        match self.program.labels.get_mut(&label) {
                            Some(info) => {
                                info.referenced = true;
                                let statement = info.statement;
                                self.mark_referenced(self.address_of(statement));
                            }
                            None => self.report(
                                i,
                                Some(target.token),
                                DiagnosticKind::TargetLabelInvalid(label),
                            ),
                        }
                    }
                    TargetKind::Tag(symbol) => match self.program.tags.get_mut(&symbol) {
                        Some(info) => {
                            info.referenced = true;
                            let statement = info.statement;
                            let address = self.address_of(statement);
                            self.mark_referenced(address);
                            match pending {
                                // two decimal bytes hold at most 9999
                                Some(_) if address > MAX_TARGET => self.report(
                                    i,
                                    Some(target.token),
                                    DiagnosticKind::TargetAddressInvalid(address),
                                ),
                                Some(pending) => self.patch(i, pending.offset, address),
                                None => (),
                            }
                        }
                        None => self.report(i, Some(target.token), DiagnosticKind::TargetTagInvalid),
                    },
                    TargetKind::Address { .. } | TargetKind::Label(_) | TargetKind::Register(_) => (),
                }
            }
            foreign = false;
        }
    }

    /// Writes a resolved tag address over the two reserved bytes.
    fn patch(&mut self, statement: usize, offset: usize, address: Address) {
        let st = &mut self.program.statements[statement];
        let bytes = [(address / 100) as OpCode, (address % 100) as OpCode];
        if let Some(slot) = st.opcodes.get_mut(offset..offset + 2) {
            slot.copy_from_slice(&bytes);
            if let StatementKind::Instruction(ins) = &mut st.kind {
                ins.pending = None;
            }
            tracing::trace!(at = st.address, address, "patched tag address");
        }
    }

    fn unreferenced(&mut self) {
        let mut unused: Vec<usize> = self
            .program
            .tags
            .values()
            .filter(|info| !info.referenced)
            .map(|info| info.statement)
            .collect();
        unused.sort_unstable();
        for statement in unused {
            self.report(statement, None, DiagnosticKind::UnreferencedTag);
        }
        // labels declared but never referenced are deliberately not reported
    }
}

/// Builds the symbol tables, validates every reference and patches tags.
pub fn resolve(program: &mut Program) {
    let mut resolver = Resolver { program };
    resolver.tables();
    resolver.references();
    resolver.unreferenced();
    tracing::debug!(
        labels = resolver.program.labels.len(),
        tags = resolver.program.tags.len(),
        diagnostics = resolver.program.diagnostics.len(),
        "resolved symbols"
    );
}
