use std::fmt::{self, Display};

use crate::labels::LabelTable;
use crate::span::Span;
use crate::symbol::{Base, Condition, Register};

/// Index of a statement inside an [`Air`]. Stands in for a pointer to an instruction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct InstrPtr(pub usize);

impl Display for InstrPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Assembly intermediate representation, the decoded instructions in source order.
#[derive(Debug, Default)]
pub struct Air {
    ast: Vec<Stmt>,
}

impl Air {
    pub fn new() -> Self {
        Air { ast: Vec::new() }
    }

    /// Append a statement, returning its pointer.
    pub fn add_stmt(&mut self, stmt: Stmt) -> InstrPtr {
        self.ast.push(stmt);
        InstrPtr(self.ast.len() - 1)
    }

    /// Pointer the next added statement will receive.
    pub fn next_ptr(&self) -> InstrPtr {
        InstrPtr(self.ast.len())
    }

    pub fn first(&self) -> Option<InstrPtr> {
        (!self.ast.is_empty()).then_some(InstrPtr(0))
    }

    /// Fallthrough successor of `ptr`, `None` past the last statement.
    pub fn next(&self, ptr: InstrPtr) -> Option<InstrPtr> {
        let next = ptr.0 + 1;
        (next < self.ast.len()).then_some(InstrPtr(next))
    }

    pub fn get(&self, ptr: InstrPtr) -> &Stmt {
        &self.ast[ptr.0]
    }

    pub fn len(&self) -> usize {
        self.ast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ast.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.ast.iter()
    }
}

impl<'a> IntoIterator for &'a Air {
    type Item = &'a Stmt;
    type IntoIter = std::slice::Iter<'a, Stmt>;

    fn into_iter(self) -> Self::IntoIter {
        self.ast.iter()
    }
}

/// A parsed file: statements plus the labels that point into them.
#[derive(Debug, Default)]
pub struct Program {
    pub air: Air,
    pub labels: LabelTable,
}

/// Single statement, remembering the source line it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Stmt {
    pub instr: Instr,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instr {
    /// Load an immediate into DR
    Mov { dest: Register, imm: i64 },
    /// Wrapping add or subtract, stored in DR
    Arith {
        op: ArithOp,
        dest: Register,
        lhs: Register,
        rhs: Operand,
    },
    /// Set flags from comparing `lhs` with `rhs`
    Compare {
        unsigned: bool,
        lhs: Register,
        rhs: Operand,
    },
    /// Print a value, followed by a newline
    Print { value: Operand, base: Base },
    /// Register-only bitwise operation
    Bitwise {
        op: BitOp,
        dest: Register,
        lhs: Register,
        rhs: Register,
    },
    Shift {
        op: ShiftOp,
        dest: Register,
        src: Register,
        amount: Operand,
    },
    /// Read `size` little-endian bytes from memory into DR
    Load {
        dest: Register,
        size: i64,
        offset: Operand,
    },
    /// Write the low `size` bytes of SR to memory, little-endian
    Store {
        src: Register,
        size: i64,
        offset: Operand,
    },
    /// Write a null-terminated string to memory
    Put { text: String, offset: Operand },
    Branch { cond: Condition, target: String },
    /// Save registers and jump to a subroutine
    Call { target: String },
    Ret,
}

/// Register or immediate, for operands that accept both.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Reg(Register),
    Imm(i64),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArithOp {
    Add,
    Sub,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BitOp {
    And,
    Eor,
    Orr,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShiftOp {
    /// Logical left
    Lsl,
    /// Logical right, zero filling
    Lsr,
    /// Arithmetic right, sign extending
    Asr,
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::Imm(val) => write!(f, "{val}"),
        }
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Mov { dest, imm } => write!(f, "mov {dest} {imm}"),
            Instr::Arith { op, dest, lhs, rhs } => {
                let name = match op {
                    ArithOp::Add => "add",
                    ArithOp::Sub => "sub",
                };
                write!(f, "{name} {dest} {lhs} {rhs}")
            }
            Instr::Compare { unsigned, lhs, rhs } => {
                let name = if *unsigned { "cmp_u" } else { "cmp" };
                write!(f, "{name} {lhs} {rhs}")
            }
            Instr::Print { value, base } => write!(f, "print {value} {base}"),
            Instr::Bitwise { op, dest, lhs, rhs } => {
                let name = match op {
                    BitOp::And => "and",
                    BitOp::Eor => "eor",
                    BitOp::Orr => "orr",
                };
                write!(f, "{name} {dest} {lhs} {rhs}")
            }
            Instr::Shift {
                op,
                dest,
                src,
                amount,
            } => {
                let name = match op {
                    ShiftOp::Lsl => "lsl",
                    ShiftOp::Lsr => "lsr",
                    ShiftOp::Asr => "asr",
                };
                write!(f, "{name} {dest} {src} {amount}")
            }
            Instr::Load { dest, size, offset } => write!(f, "load {dest} {size} {offset}"),
            // Offset comes before the size in source
            Instr::Store { src, size, offset } => write!(f, "store {src} {offset} {size}"),
            Instr::Put { text, offset } => write!(f, "put {text:?} {offset}"),
            Instr::Branch { cond, target } => write!(f, "{cond} {target}"),
            Instr::Call { target } => write!(f, "call {target}"),
            Instr::Ret => f.write_str("ret"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Idx;

    fn stmt(instr: Instr) -> Stmt {
        Stmt {
            instr,
            span: Span::new(Idx(0), 0),
        }
    }

    #[test]
    fn pointers_follow_source_order() {
        let mut air = Air::new();
        assert_eq!(air.first(), None);
        assert_eq!(air.next_ptr(), InstrPtr(0));
        let a = air.add_stmt(stmt(Instr::Ret));
        let b = air.add_stmt(stmt(Instr::Ret));
        assert_eq!(air.first(), Some(a));
        assert_eq!(air.next(a), Some(b));
        assert_eq!(air.next(b), None);
    }

    #[test]
    fn display_store_order() {
        let instr = Instr::Store {
            src: Register::RETURN,
            size: 8,
            offset: Operand::Imm(16),
        };
        assert_eq!(instr.to_string(), "store x0 16 8");
    }
}
