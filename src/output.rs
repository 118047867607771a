use std::cell::RefCell;
use std::io::{self, Write};
use std::str::Chars;

use colored::Colorize;

use crate::runtime::RunState;
use crate::symbol::Register;

thread_local! {
    static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
}

pub fn set_minimal(new_value: bool) -> bool {
    IS_MINIMAL.with(|value| value.replace(new_value))
}

pub fn is_minimal() -> bool {
    IS_MINIMAL.with(|value| *value.borrow())
}

/// Visible width of the table, between the borders
const TABLE_WIDTH: usize = 92;
const REGS_PER_ROW: usize = 2;

/// Write the final machine state. Plain dump if `--minimal`, otherwise a table.
pub fn write_state<W: Write>(state: &RunState, f: &mut W) -> io::Result<()> {
    if is_minimal() {
        return state.write_state(f);
    }

    writeln!(f, "{}", border('┌', '┐'))?;

    let status = if state.had_error() {
        "error".red().bold()
    } else {
        "ok".green().bold()
    };
    let flags = state.flags();
    let header = format!(
        "{} {status}    {} {}  {}  {}",
        "status".italic(),
        "flags".italic(),
        flag("greater", flags.greater),
        flag("equal", flags.equal),
        flag("less", flags.less),
    );
    writeln!(f, "{}", row(&header))?;
    writeln!(f, "{}", border('├', '┤'))?;

    for (row_idx, values) in state.registers().chunks(REGS_PER_ROW).enumerate() {
        let cells: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| register_cell(row_idx * REGS_PER_ROW + i, value))
            .collect();
        writeln!(f, "{}", row(&cells.join("  ")))?;
    }

    writeln!(f, "{}", border('└', '┘'))
}

fn flag(name: &str, set: bool) -> String {
    if set {
        format!("{} {}", name, "1".bold())
    } else {
        format!("{name} 0").dimmed().to_string()
    }
}

fn register_cell(index: usize, value: i64) -> String {
    debug_assert!(index < Register::COUNT);
    let name = format!("{:<3}", format!("x{index}")).bold();
    let hex = format!("{:#018x}", value as u64);
    let dec = format!("{value:>20}");
    if value == 0 {
        format!("{name}  {}  {}", hex.dimmed(), dec.dimmed())
    } else {
        format!("{name}  {hex}  {dec}")
    }
}

fn row(content: &str) -> String {
    let pad = TABLE_WIDTH.saturating_sub(visible_width(content));
    format!(
        "{} {content}{} {}",
        "│".dimmed(),
        " ".repeat(pad),
        "│".dimmed()
    )
}

fn border(left: char, right: char) -> String {
    let line: String = "─".repeat(TABLE_WIDTH + 2);
    format!("{left}{line}{right}").dimmed().to_string()
}

fn visible_width(string: &str) -> usize {
    Decolored::new(string).count()
}

/// Characters of a string with ANSI escape sequences removed.
struct Decolored<'a> {
    chars: Chars<'a>,
}

impl<'a> Decolored<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            chars: string.chars(),
        }
    }
}

impl<'a> Iterator for Decolored<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            // Skip everything between '\x1b' and 'm' (inclusive)
            if ch == '\x1b' {
                while self.chars.next().is_some_and(|ch| ch != 'm') {}
                continue;
            }
            return Some(ch);
        }
        None
    }
}
