// Parsing
mod lexer;
pub use lexer::{tokenize, Token, TokenKind};
mod parser;
pub use parser::{parse_number, AsmParser, Parsed};
mod air;
pub use air::{Air, Instr, InstrPtr, Operand, Program, Stmt};
mod labels;
pub use labels::{Entry, LabelTable, LABEL_TABLE_CAPACITY};

// Running
mod runtime;
pub use runtime::{Flags, RunConfig, RunState, LOCAL_LABEL_PREFIX};
mod memory;
pub use memory::{Memory, OutOfBounds, DEFAULT_MEMORY_CAPACITY};
pub mod output;

mod span;
pub use span::{Idx, Span};
mod symbol;
pub use symbol::{Base, Condition, InstrKind, Register};

pub mod error;

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 8;
