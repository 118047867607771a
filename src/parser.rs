use std::borrow::Cow;

use miette::{Report, Result};
use tracing::{debug, warn};

use crate::{
    air::{Air, ArithOp, BitOp, Instr, InstrPtr, Operand, Program, ShiftOp, Stmt},
    error,
    labels::{LabelTable, LABEL_TABLE_CAPACITY},
    lexer::{Lexer, Token, TokenKind},
    span::Span,
    symbol::{Base, InstrKind, Register},
};

/// Decode a numeric literal. Decimal by default, `0x` and `0b` select hex and binary when
/// followed by at least one more character. The whole text must be consumed.
///
/// Hex and binary literals are read as 64-bit patterns, so `0xffffffffffffffff` is `-1`.
pub fn parse_number(text: &str) -> Option<i64> {
    let (digits, radix) = match text.as_bytes() {
        [b'0', b'x', _, ..] => (&text[2..], 16),
        [b'0', b'b', _, ..] => (&text[2..], 2),
        _ => return text.parse::<i64>().ok(),
    };
    u64::from_str_radix(digits, radix).ok().map(|val| val as i64)
}

/// Whether a token is shaped like a register, so that it is decoded as one (and fails loudly if
/// the index is bad) rather than being considered for other operand kinds.
fn is_register_candidate(tok: &Token) -> bool {
    tok.kind == TokenKind::Ident && tok.text.len() >= 2 && tok.text.starts_with('x')
}

fn unescape(s: &str) -> Cow<str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(c) => {
                result.push('\\');
                result.push(c);
            }
            // Trailing backslash; include it as is
            None => result.push('\\'),
        }
    }
    Cow::Owned(result)
}

/// Outcome of parsing a file.
///
/// On error, `program` holds every statement decoded before the failure. A duplicate label is
/// the one error where the offending statement is still included.
pub struct Parsed {
    pub program: Program,
    pub error: Option<Report>,
}

impl Parsed {
    pub fn had_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> Result<Program> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.program),
        }
    }
}

/// Transforms token stream into AIR, using two tokens of lookahead
pub struct AsmParser<'a> {
    /// Reference to the source file
    src: &'a str,
    lexer: Lexer<'a>,
    current: Token<'a>,
    next: Token<'a>,
    /// Span of the last consumed token
    prev_span: Span,
    air: Air,
    labels: LabelTable,
    error: Option<Report>,
}

impl<'a> AsmParser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_label_capacity(src, LABEL_TABLE_CAPACITY)
    }

    pub fn with_label_capacity(src: &'a str, capacity: usize) -> Self {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token();
        let next = lexer.next_token();
        AsmParser {
            src,
            lexer,
            current,
            next,
            prev_span: current.span,
            air: Air::new(),
            labels: LabelTable::with_capacity(capacity),
            error: None,
        }
    }

    /// Create AIR out of token stream. Parsing stops at the first error.
    pub fn parse(mut self) -> Parsed {
        while self.error.is_none() && !self.is_at_end() {
            match self.parse_line() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(err) => self.error = Some(err),
            }
        }
        debug!(
            instructions = self.air.len(),
            labels = self.labels.len(),
            failed = self.error.is_some(),
            "parsed program"
        );
        Parsed {
            program: Program {
                air: self.air,
                labels: self.labels,
            },
            error: self.error,
        }
    }

    fn advance(&mut self) -> Token<'a> {
        let tok = self.current;
        if !self.is_at_end() {
            self.prev_span = tok.span;
            self.current = self.next;
            self.next = self.lexer.next_token();
        }
        tok
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.current.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_newlines(&mut self) {
        while self.consume(TokenKind::Newline) {}
    }

    /// Parse one labelled or unlabelled instruction and add it to the AIR.
    ///
    /// Returns `None` if the input ran out before an instruction was found.
    fn parse_line(&mut self) -> Result<Option<InstrPtr>> {
        self.skip_newlines();
        let tok = self.current;

        // Labels wrap whatever instruction follows them, possibly on a later line
        if tok.kind == TokenKind::Ident && self.next.kind == TokenKind::Colon {
            self.advance();
            self.advance();
            let ptr = self.parse_line()?;
            match ptr {
                Some(ptr) => {
                    if self.labels.put(tok.text, ptr).is_err() {
                        // Statement stays in the AIR, but parsing stops after it
                        let src = self.src;
                        self.error
                            .get_or_insert_with(|| error::parse_duplicate_label(src, tok));
                    }
                }
                None => warn!(label = tok.text, "label is not followed by an instruction"),
            }
            return Ok(ptr);
        }

        let kind = match tok.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Instr(kind) => kind,
            TokenKind::Str { terminated: false } => {
                return Err(error::lex_unclosed_str(self.src, tok))
            }
            TokenKind::Unknown => return Err(error::lex_unknown(self.src, tok)),
            _ => return Err(self.unexpected("instruction")),
        };
        self.advance();
        let instr = self.parse_instr(kind)?;
        let span = tok.span.to(self.prev_span);
        self.expect_terminator()?;

        Ok(Some(self.air.add_stmt(Stmt { instr, span })))
    }

    /// Process the operands following an instruction keyword
    fn parse_instr(&mut self, kind: InstrKind) -> Result<Instr> {
        let instr = match kind {
            InstrKind::Mov => {
                let dest = self.expect_reg()?;
                let imm = self.expect_imm()?;
                Instr::Mov { dest, imm }
            }
            InstrKind::Add | InstrKind::Sub => {
                let op = if kind == InstrKind::Add {
                    ArithOp::Add
                } else {
                    ArithOp::Sub
                };
                let dest = self.expect_reg()?;
                let lhs = self.expect_reg()?;
                let rhs = self.expect_operand()?;
                Instr::Arith { op, dest, lhs, rhs }
            }
            InstrKind::Cmp | InstrKind::CmpU => {
                let lhs = self.expect_reg()?;
                let rhs = self.expect_operand()?;
                Instr::Compare {
                    unsigned: kind == InstrKind::CmpU,
                    lhs,
                    rhs,
                }
            }
            InstrKind::Print => {
                let value = self.expect_operand()?;
                let base = self.expect_base()?;
                Instr::Print { value, base }
            }
            InstrKind::And | InstrKind::Eor | InstrKind::Orr => {
                let op = match kind {
                    InstrKind::And => BitOp::And,
                    InstrKind::Eor => BitOp::Eor,
                    _ => BitOp::Orr,
                };
                let dest = self.expect_reg()?;
                let lhs = self.expect_reg()?;
                let rhs = self.expect_reg()?;
                Instr::Bitwise { op, dest, lhs, rhs }
            }
            InstrKind::Lsl | InstrKind::Lsr | InstrKind::Asr => {
                let op = match kind {
                    InstrKind::Lsl => ShiftOp::Lsl,
                    InstrKind::Lsr => ShiftOp::Lsr,
                    _ => ShiftOp::Asr,
                };
                let dest = self.expect_reg()?;
                let src = self.expect_reg()?;
                let amount = self.expect_operand()?;
                Instr::Shift {
                    op,
                    dest,
                    src,
                    amount,
                }
            }
            InstrKind::Load => {
                let dest = self.expect_reg()?;
                let size = self.expect_imm()?;
                let offset = self.expect_operand()?;
                Instr::Load { dest, size, offset }
            }
            InstrKind::Store => {
                // Offset is written before the size
                let src = self.expect_reg()?;
                let offset = self.expect_operand()?;
                let size = self.expect_imm()?;
                Instr::Store { src, size, offset }
            }
            InstrKind::Put => {
                let text = self.expect_str()?;
                let offset = self.expect_operand()?;
                Instr::Put { text, offset }
            }
            InstrKind::Br(cond) => {
                let target = self.expect_label()?;
                Instr::Branch { cond, target }
            }
            InstrKind::Call => {
                let target = self.expect_label()?;
                Instr::Call { target }
            }
            InstrKind::Ret => Instr::Ret,
        };
        Ok(instr)
    }

    fn unexpected(&self, expected: &str) -> Report {
        match self.current.kind {
            TokenKind::Eof => error::parse_eof(self.src, expected),
            _ => error::parse_generic_unexpected(self.src, expected, self.current),
        }
    }

    fn expect_terminator(&mut self) -> Result<()> {
        if self.consume(TokenKind::Newline) || self.is_at_end() {
            Ok(())
        } else {
            Err(error::parse_missing_terminator(self.src, self.current))
        }
    }

    fn expect_reg(&mut self) -> Result<Register> {
        if !is_register_candidate(&self.current) {
            return Err(self.unexpected("register"));
        }
        let tok = self.current;
        let reg = tok
            .text
            .parse()
            .map_err(|_| error::parse_bad_register(self.src, tok))?;
        self.advance();
        Ok(reg)
    }

    fn expect_imm(&mut self) -> Result<i64> {
        if self.current.kind != TokenKind::Num {
            return Err(self.unexpected("numeric literal"));
        }
        let tok = self.current;
        let val = parse_number(tok.text).ok_or_else(|| error::parse_bad_literal(self.src, tok))?;
        self.advance();
        Ok(val)
    }

    /// Register if the token looks like one, otherwise an immediate
    fn expect_operand(&mut self) -> Result<Operand> {
        if is_register_candidate(&self.current) {
            return self.expect_reg().map(Operand::Reg);
        }
        if self.current.kind == TokenKind::Num {
            return self.expect_imm().map(Operand::Imm);
        }
        Err(self.unexpected("register or numeric literal"))
    }

    /// Bases are matched on text alone; `b` is lexed as the branch mnemonic.
    fn expect_base(&mut self) -> Result<Base> {
        let tok = self.current;
        match tok.kind {
            TokenKind::Eof | TokenKind::Newline => Err(self.unexpected("print base")),
            _ => {
                let base = tok
                    .text
                    .parse()
                    .map_err(|_| error::parse_bad_base(self.src, tok))?;
                self.advance();
                Ok(base)
            }
        }
    }

    fn expect_label(&mut self) -> Result<String> {
        if self.current.kind != TokenKind::Ident {
            return Err(self.unexpected("label"));
        }
        Ok(self.advance().text.to_string())
    }

    fn expect_str(&mut self) -> Result<String> {
        let tok = self.current;
        match tok.kind {
            TokenKind::Str { terminated: true } => {
                self.advance();
                // Get rid of start and end \"
                Ok(unescape(&tok.text[1..tok.text.len() - 1]).into_owned())
            }
            TokenKind::Str { terminated: false } => Err(error::lex_unclosed_str(self.src, tok)),
            _ => Err(self.unexpected("string literal")),
        }
    }
}
