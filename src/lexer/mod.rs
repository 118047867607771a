use std::fmt::{self, Display};

use crate::lexer::cursor::Cursor;
use crate::span::{Idx, Span};
use crate::symbol::InstrKind;

pub mod cursor;

/// A 'light' token that only carries basic and easily derivable info
#[derive(Debug)]
pub struct LToken {
    pub kind: TokenKind,
    pub len: u32,
}

impl LToken {
    pub fn new(kind: TokenKind, len: u32) -> Self {
        LToken { kind, len }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Ident,
    /// Numeric literal, digits are validated by the parser.
    Num,
    /// Quotes included in the token text.
    Str {
        terminated: bool,
    },
    Colon,
    Newline,
    Instr(InstrKind),
    Comment,
    /// Also includes commas
    Whitespace,
    Unknown,
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => f.write_str("identifier"),
            TokenKind::Num => f.write_str("numeric literal"),
            TokenKind::Str { .. } => f.write_str("string literal"),
            TokenKind::Colon => f.write_str("colon"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Instr(kind) => write!(f, "instruction `{kind}`"),
            TokenKind::Comment => f.write_str("comment"),
            TokenKind::Whitespace => f.write_str("whitespace"),
            TokenKind::Unknown => f.write_str("unknown"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

/// Classified token with a view into the source it was read from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Test if a character separates tokens. Newlines are tokens of their own.
pub(crate) fn is_whitespace(c: char) -> bool {
    // Commas are essentially whitespace
    matches!(c, ' ' | '\t' | '\r' | ',')
}

pub(crate) fn is_id_start(c: char) -> bool {
    // `.` allows compiler-style local labels such as `.L3`
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '.')
}

pub(crate) fn is_id(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.')
}

fn is_num_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Cursor<'_> {
    pub fn advance_token(&mut self) -> LToken {
        let first_char = match self.bump() {
            Some(c) => c,
            None => return LToken::new(TokenKind::Eof, 0),
        };
        let token_kind = match first_char {
            ';' => {
                self.take_while(|c| c != '\n');
                TokenKind::Comment
            }
            '/' if self.first() == '/' => {
                self.take_while(|c| c != '\n');
                TokenKind::Comment
            }
            '\n' => TokenKind::Newline,
            c if is_whitespace(c) => {
                self.take_while(is_whitespace);
                TokenKind::Whitespace
            }
            ':' => TokenKind::Colon,
            '0'..='9' => {
                self.take_while(is_num_continue);
                TokenKind::Num
            }
            '-' if self.first().is_ascii_digit() => {
                self.take_while(is_num_continue);
                TokenKind::Num
            }
            // Mnemonics are resolved from the text by `Lexer`
            c if is_id_start(c) => {
                self.take_while(is_id);
                TokenKind::Ident
            }
            '"' => self.string(),
            _ => TokenKind::Unknown,
        };
        let res = LToken::new(token_kind, self.pos_in_token());
        self.reset_pos();
        res
    }

    /// String literals may not span lines.
    fn string(&mut self) -> TokenKind {
        loop {
            match self.first() {
                '"' => {
                    self.bump();
                    return TokenKind::Str { terminated: true };
                }
                '\n' => break,
                _ if self.is_eof() => break,
                '\\' => {
                    self.bump();
                    if self.first() != '\n' {
                        self.bump();
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
        TokenKind::Str { terminated: false }
    }
}

/// Pull-based token source. Whitespace and comments are skipped, and `Eof` is returned forever
/// once the input is exhausted.
pub struct Lexer<'a> {
    src: &'a str,
    cursor: Cursor<'a>,
    offs: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            cursor: Cursor::new(src),
            offs: 0,
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            let tok = self.next_raw();
            if !matches!(tok.kind, TokenKind::Whitespace | TokenKind::Comment) {
                return tok;
            }
        }
    }

    fn next_raw(&mut self) -> Token<'a> {
        let LToken { kind, len } = self.cursor.advance_token();
        let span = Span::new(Idx(self.offs), len);
        self.offs += len;
        let text = &self.src[span.as_range()];
        let kind = match kind {
            TokenKind::Ident => InstrKind::from_mnemonic(text)
                .map(TokenKind::Instr)
                .unwrap_or(TokenKind::Ident),
            kind => kind,
        };
        Token { kind, text, span }
    }
}

/// Not actually used in parsing, more for debug purposes.
pub fn tokenize(input: &str) -> impl Iterator<Item = Token<'_>> + '_ {
    let mut lexer = Lexer::new(input);
    std::iter::from_fn(move || {
        let token = lexer.next_token();
        if token.kind != TokenKind::Eof {
            Some(token)
        } else {
            None
        }
    })
}
