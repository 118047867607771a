use std::io;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::lexer::Token;
use crate::memory::OutOfBounds;
use crate::span::Span;

// Lexer errors

pub fn lex_unclosed_str(src: &str, tok: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::unclosed_str",
        help = "make sure to close string literals with a \" character on the same line.",
        labels = vec![LabeledSpan::at(tok.span, "incorrect literal")],
        "Encountered an unterminated string literal.",
    )
    .with_source_code(src.to_string())
}

pub fn lex_unknown(src: &str, tok: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "lex::unknown",
        help = "only identifiers, numbers, strings, `:` and `,` may appear in a program",
        labels = vec![LabeledSpan::at(tok.span, "unknown token")],
        "Encountered an unknown token",
    )
    .with_source_code(src.to_string())
}

// Parser errors

pub fn parse_generic_unexpected(src: &str, expected: &str, found: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::unexpected_token",
        help = "check the operands for this instruction",
        labels = vec![LabeledSpan::at(found.span, "unexpected token")],
        "Expected token of type {expected}, found {}",
        found.kind
    )
    .with_source_code(src.to_string())
}

pub fn parse_eof(src: &str, expected: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::unexpected_eof",
        help = "you may be missing operands in your last statement",
        labels = vec![LabeledSpan::at_offset(src.len(), "end of file")],
        "Unexpected end of file, expected {expected}",
    )
    .with_source_code(src.to_string())
}

pub fn parse_bad_register(src: &str, tok: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::bad_register",
        help = "registers are written x0 to x31",
        labels = vec![LabeledSpan::at(tok.span, "invalid register")],
        "Encountered an invalid register `{}`",
        tok.text
    )
    .with_source_code(src.to_string())
}

pub fn parse_bad_literal(src: &str, tok: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::bad_literal",
        help = "literals are decimal, or hex/binary with a 0x/0b prefix, and must fit in 64 bits",
        labels = vec![LabeledSpan::at(tok.span, "incorrect literal")],
        "Encountered an invalid literal `{}`",
        tok.text
    )
    .with_source_code(src.to_string())
}

pub fn parse_bad_base(src: &str, tok: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::bad_base",
        help = "print takes one of d (decimal), x (hex), b (binary) or s (string)",
        labels = vec![LabeledSpan::at(tok.span, "unknown base")],
        "Encountered an invalid print base `{}`",
        tok.text
    )
    .with_source_code(src.to_string())
}

pub fn parse_missing_terminator(src: &str, found: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::missing_terminator",
        help = "each instruction must be on its own line",
        labels = vec![LabeledSpan::at(found.span, "expected end of line")],
        "Expected end of line after instruction, found {}",
        found.kind
    )
    .with_source_code(src.to_string())
}

pub fn parse_duplicate_label(src: &str, label: Token) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::duplicate_label",
        help = "labels may only be defined once per file",
        labels = vec![LabeledSpan::at(label.span, "duplicate label")],
        "Duplicate label `{}`",
        label.text
    )
    .with_source_code(src.to_string())
}

// Runtime errors. Source code is attached by the caller.

pub fn exec_shift_amount(span: Span, amount: i64) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::shift_amount",
        help = "shift amounts must be between 0 and 63",
        labels = vec![LabeledSpan::at(span, "invalid shift")],
        "Shift amount {amount} is out of range",
    )
}

pub fn exec_memory_bounds(span: Span, err: OutOfBounds) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::memory_bounds",
        help = format!(
            "memory addresses run from 0 to {}",
            err.capacity.saturating_sub(1)
        ),
        labels = vec![LabeledSpan::at(span, "out of bounds access")],
        "{err}",
    )
}

pub fn exec_memory_size(span: Span, size: i64, allowed: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::memory_size",
        help = format!("this instruction accepts sizes of {allowed} bytes"),
        labels = vec![LabeledSpan::at(span, "invalid size")],
        "Invalid access size of {size} bytes",
    )
}

pub fn exec_label_not_found(span: Span, label: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::label_not_found",
        help = "check that the label is defined in this file",
        labels = vec![LabeledSpan::at(span, "unresolved label")],
        "Label not found: {label}",
    )
}

pub fn exec_step_limit(span: Span, limit: u64) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::step_limit",
        help = "raise the limit with --max-steps or ARMLET_MAX_STEPS if the program should run longer",
        labels = vec![LabeledSpan::at(span, "limit reached here")],
        "Program exceeded its budget of {limit} instructions",
    )
}

pub fn exec_output(err: io::Error) -> Report {
    miette!(
        severity = Severity::Error,
        code = "exec::output",
        "Failed to write program output: {err}",
    )
}

/// Diagnostic code of a report, for matching on error kinds.
pub fn code_of(report: &Report) -> Option<String> {
    report.code().map(|code| code.to_string())
}
