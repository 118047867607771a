use std::fmt::{self, Display};
use std::str::FromStr;

/// One of the 32 general purpose registers, written `x0` to `x31`.
///
/// Can only be constructed from a valid index, so register operands never need a bounds check
/// at runtime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Register(u8);

impl Register {
    pub const COUNT: usize = 32;
    /// Carries a subroutine's return value; never restored by `ret`.
    pub const RETURN: Register = Register(0);

    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Register(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FromStr for Register {
    type Err = ();

    /// `x` followed by a decimal index in `0..=31`. Signs and other characters are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('x').ok_or(())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        let index: usize = digits.parse().map_err(|_| ())?;
        Register::new(index).ok_or(())
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Branch condition, tested against the flags left by the last comparison.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Condition {
    /// Unconditional
    Always,
    /// ==
    Eq,
    /// !=
    Ne,
    /// >
    Gt,
    /// >=
    Ge,
    /// <
    Lt,
    /// <=
    Le,
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Always => "b",
            Condition::Eq => "b.eq",
            Condition::Ne => "b.ne",
            Condition::Gt => "b.gt",
            Condition::Ge => "b.ge",
            Condition::Lt => "b.lt",
            Condition::Le => "b.le",
        })
    }
}

/// Radix used by `print`. `Str` treats the value as a memory offset of a null-terminated string.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Base {
    Dec,
    Hex,
    Bin,
    Str,
}

impl FromStr for Base {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Base::Dec),
            "x" => Ok(Base::Hex),
            "b" => Ok(Base::Bin),
            "s" => Ok(Base::Str),
            _ => Err(()),
        }
    }
}

impl Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Base::Dec => "d",
            Base::Hex => "x",
            Base::Bin => "b",
            Base::Str => "s",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstrKind {
    Mov,
    Add,
    Sub,
    Cmp,
    CmpU,
    Print,
    And,
    Eor,
    Orr,
    Lsl,
    Lsr,
    Asr,
    Load,
    Store,
    Put,
    Br(Condition),
    Call,
    Ret,
}

impl InstrKind {
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let kind = match s {
            "mov" => InstrKind::Mov,
            "add" => InstrKind::Add,
            "sub" => InstrKind::Sub,
            "cmp" => InstrKind::Cmp,
            "cmp_u" => InstrKind::CmpU,
            "print" => InstrKind::Print,
            "and" => InstrKind::And,
            "eor" | "xor" => InstrKind::Eor,
            "orr" | "or" => InstrKind::Orr,
            "lsl" => InstrKind::Lsl,
            "lsr" => InstrKind::Lsr,
            "asr" => InstrKind::Asr,
            "load" => InstrKind::Load,
            "store" => InstrKind::Store,
            "put" => InstrKind::Put,
            "b" => InstrKind::Br(Condition::Always),
            "b.eq" => InstrKind::Br(Condition::Eq),
            "b.ne" => InstrKind::Br(Condition::Ne),
            "b.gt" => InstrKind::Br(Condition::Gt),
            "b.ge" => InstrKind::Br(Condition::Ge),
            "b.lt" => InstrKind::Br(Condition::Lt),
            "b.le" => InstrKind::Br(Condition::Le),
            "call" => InstrKind::Call,
            "ret" => InstrKind::Ret,
            _ => return None,
        };
        Some(kind)
    }
}

impl Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrKind::Mov => "mov",
            InstrKind::Add => "add",
            InstrKind::Sub => "sub",
            InstrKind::Cmp => "cmp",
            InstrKind::CmpU => "cmp_u",
            InstrKind::Print => "print",
            InstrKind::And => "and",
            InstrKind::Eor => "eor",
            InstrKind::Orr => "orr",
            InstrKind::Lsl => "lsl",
            InstrKind::Lsr => "lsr",
            InstrKind::Asr => "asr",
            InstrKind::Load => "load",
            InstrKind::Store => "store",
            InstrKind::Put => "put",
            InstrKind::Br(cond) => return write!(f, "{cond}"),
            InstrKind::Call => "call",
            InstrKind::Ret => "ret",
        };
        f.write_str(name)
    }
}
