//! TI-59 key table.

use std::sync::LazyLock;

use ahash::AHashMap;

pub type OpCode = u8;

pub mod op {
    use super::OpCode;

    pub const INV: OpCode = 22;
    pub const PGM: OpCode = 36;
    pub const IND: OpCode = 40;
    pub const EE: OpCode = 52;
    pub const GTO: OpCode = 61;
    pub const PGM_IND: OpCode = 62;
    pub const SBR: OpCode = 71;
    pub const LBL: OpCode = 76;
    pub const FIX: OpCode = 58;
    pub const RTN: OpCode = 92;
    pub const DOT: OpCode = 93;
    pub const SIGN: OpCode = 94;
}

/// How the operands following a key are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Atomic,
    /// `STO 12`, `STO Ind 12`
    Argument,
    /// `ST* 12`: the argument is always a register holding the real one.
    IndirectArgument,
    /// `GTO 240`, `SBR @loop`, `x=t A`
    Branch,
    /// `GO* 12`
    IndirectBranch,
    /// `Dsz 1 240`, `If flg Ind 05 Ind 06`
    ArgumentBranch,
    /// `Lbl A`, `Lbl 25`
    Label,
    /// `Ind`, only valid after another key.
    Indirect,
}

pub struct Key {
    pub mnemonic: &'static str,
    pub aliases: &'static [&'static str],
    pub ops: &'static [OpCode],
    pub syntax: Syntax,
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.ops == other.ops
    }
}
impl Eq for Key {}

impl Key {
    /// First opcode of the key, the one a label made of this key stands for.
    pub fn code(&self) -> OpCode {
        self.ops[0]
    }
    /// Keys that expand to `INV x` by themselves.
    pub fn is_inverted(&self) -> bool {
        self.ops.len() > 1 && self.ops[0] == op::INV
    }
}

const fn key(
    mnemonic: &'static str,
    aliases: &'static [&'static str],
    ops: &'static [OpCode],
    syntax: Syntax,
) -> Key {
    Key {
        mnemonic,
        aliases,
        ops,
        syntax,
    }
}

use Syntax::*;

pub static KEYS: &[Key] = &[
    key("0", &[], &[0], Atomic),
    key("1", &[], &[1], Atomic),
    key("2", &[], &[2], Atomic),
    key("3", &[], &[3], Atomic),
    key("4", &[], &[4], Atomic),
    key("5", &[], &[5], Atomic),
    key("6", &[], &[6], Atomic),
    key("7", &[], &[7], Atomic),
    key("8", &[], &[8], Atomic),
    key("9", &[], &[9], Atomic),
    key("E'", &[], &[10], Atomic),
    key("A", &[], &[11], Atomic),
    key("B", &[], &[12], Atomic),
    key("C", &[], &[13], Atomic),
    key("D", &[], &[14], Atomic),
    key("E", &[], &[15], Atomic),
    key("A'", &[], &[16], Atomic),
    key("B'", &[], &[17], Atomic),
    key("C'", &[], &[18], Atomic),
    key("D'", &[], &[19], Atomic),
    key("INV", &[], &[22], Atomic),
    key("lnx", &["ln"], &[23], Atomic),
    key("CE", &[], &[24], Atomic),
    key("CLR", &[], &[25], Atomic),
    key("log", &[], &[28], Atomic),
    key("CP", &[], &[29], Atomic),
    key("tan", &[], &[30], Atomic),
    key("x⇄t", &["x<>t"], &[32], Atomic),
    key("x²", &["x^2"], &[33], Atomic),
    key("√x", &["sqrt"], &[34], Atomic),
    key("1/x", &[], &[35], Atomic),
    key("Pgm", &[], &[36], Argument),
    key("P→R", &["P->R"], &[37], Atomic),
    key("sin", &[], &[38], Atomic),
    key("cos", &[], &[39], Atomic),
    key("Ind", &[], &[40], Indirect),
    key("STO", &[], &[42], Argument),
    key("RCL", &[], &[43], Argument),
    key("SUM", &[], &[44], Argument),
    key("y^x", &[], &[45], Atomic),
    key("CMs", &[], &[47], Atomic),
    key("Exc", &[], &[48], Argument),
    key("Prd", &[], &[49], Argument),
    key("|x|", &["abs"], &[50], Atomic),
    key("EE", &[], &[52], Atomic),
    key("(", &[], &[53], Atomic),
    key(")", &[], &[54], Atomic),
    key("÷", &["/"], &[55], Atomic),
    key("Eng", &[], &[57], Atomic),
    key("Fix", &[], &[58], Argument),
    key("Int", &[], &[59], Atomic),
    key("Deg", &[], &[60], Atomic),
    key("GTO", &[], &[61], Branch),
    key("Pg*", &["Pgm*"], &[62], IndirectArgument),
    key("Ex*", &["Exc*"], &[63], IndirectArgument),
    key("Pd*", &["Prd*"], &[64], IndirectArgument),
    key("×", &["*"], &[65], Atomic),
    key("Pause", &[], &[66], Atomic),
    key("x=t", &[], &[67], Branch),
    key("Nop", &[], &[68], Atomic),
    key("Op", &[], &[69], Argument),
    key("Rad", &[], &[70], Atomic),
    key("SBR", &[], &[71], Branch),
    key("ST*", &["STO*"], &[72], IndirectArgument),
    key("RC*", &["RCL*"], &[73], IndirectArgument),
    key("SM*", &["SUM*"], &[74], IndirectArgument),
    key("−", &["-"], &[75], Atomic),
    key("Lbl", &[], &[76], Label),
    key("x≥t", &["x>=t"], &[77], Branch),
    key("Σ+", &["S+"], &[78], Atomic),
    key("x̄", &["mean"], &[79], Atomic),
    key("Grad", &[], &[80], Atomic),
    key("RST", &[], &[81], Atomic),
    key("HIR", &[], &[82], Argument),
    key("GO*", &["GTO*"], &[83], IndirectBranch),
    key("Op*", &[], &[84], IndirectArgument),
    key("+", &[], &[85], Atomic),
    key("St flg", &["StFlg", "Stf"], &[86], Argument),
    key("If flg", &["IfFlg", "Iff"], &[87], ArgumentBranch),
    key("D.MS", &["DMS"], &[88], Atomic),
    key("π", &["pi"], &[89], Atomic),
    key("List", &[], &[90], Atomic),
    key("R/S", &[], &[91], Atomic),
    key("RTN", &[], &[92], Atomic),
    key(".", &[], &[93], Atomic),
    key("+/-", &[], &[94], Atomic),
    key("=", &[], &[95], Atomic),
    key("Write", &[], &[96], Atomic),
    key("Dsz", &[], &[97], ArgumentBranch),
    key("Adv", &[], &[98], Atomic),
    key("Prt", &[], &[99], Atomic),
    key("e^x", &[], &[22, 23], Atomic),
    key("10^x", &[], &[22, 28], Atomic),
];

static BY_NAME: LazyLock<AHashMap<String, &'static Key>> = LazyLock::new(|| {
    KEYS.iter()
        .flat_map(|k| {
            std::iter::once(k.mnemonic)
                .chain(k.aliases.iter().copied())
                .map(move |name| (name.to_lowercase(), k))
        })
        .collect()
});

/// Case-insensitive lookup by mnemonic or alias.
pub fn lookup(name: &str) -> Option<&'static Key> {
    BY_NAME.get(&name.to_lowercase()).copied()
}

/// Single-opcode key by its code.
pub fn by_code(code: OpCode) -> Option<&'static Key> {
    KEYS.iter().find(|k| k.ops == [code])
}

/// Opcodes that fold a following `Ind` into themselves.
static INDIRECT_VARIANTS: [(OpCode, OpCode); 8] = [
    (42, 72), // STO -> ST*
    (43, 73), // RCL -> RC*
    (44, 74), // SUM -> SM*
    (48, 63), // Exc -> Ex*
    (49, 64), // Prd -> Pd*
    (36, 62), // Pgm -> Pg*
    (69, 84), // Op -> Op*
    (61, 83), // GTO -> GO*
];

pub fn indirect_variant(code: OpCode) -> Option<OpCode> {
    INDIRECT_VARIANTS
        .iter()
        .find_map(|&(base, merged)| (base == code).then_some(merged))
}
