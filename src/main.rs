use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use armlet::{output, tokenize, AsmParser, Program, RunState, TokenKind};

/// Armlet assembles and runs programs for a small 64-bit register machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a `.asm` file and print its output to the terminal
    Run {
        /// `.asm` file to run
        name: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Print flags and registers once the program stops
        #[arg(short, long)]
        state: bool,
        /// Stop with an error after this many instructions
        #[arg(long, value_name = "N")]
        max_steps: Option<u64>,
        /// Size of memory in bytes
        #[arg(long, value_name = "BYTES")]
        memory: Option<usize>,
    },
    /// Check a `.asm` file without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print the tokens of a `.asm` file
    Tokens {
        /// File to tokenize
        name: PathBuf,
    },
}

/// Settings for `run` taken from the command line.
#[derive(Default)]
struct RunOptions {
    minimal: bool,
    state: bool,
    max_steps: Option<u64>,
    memory: Option<usize>,
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .without_time()
        .init();
    armlet::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(armlet::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                minimal,
                state,
                max_steps,
                memory,
            } => run(
                &name,
                RunOptions {
                    minimal,
                    state,
                    max_steps,
                    memory,
                },
            ),
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let src = read_source(&name)?;
                let program = assemble(&src)?;
                let summary = format!(
                    "{} instructions, {} labels",
                    program.air.len(),
                    program.labels.len()
                );
                message(Green, "Success", &summary);
                for entry in program.labels.entries() {
                    message(Cyan, "Label", &format!("{} at {}", entry.name, entry.ptr));
                }
                Ok(())
            }
            Command::Tokens { name } => {
                let src = read_source(&name)?;
                let mut stdout = io::stdout().lock();
                for tok in tokenize(&src) {
                    if tok.kind == TokenKind::Eof {
                        break;
                    }
                    writeln!(
                        stdout,
                        "{:>5}..{:<5} {:<20} {:?}",
                        tok.span.offs(),
                        tok.span.end(),
                        tok.kind.to_string(),
                        tok.text
                    )
                    .into_diagnostic()?;
                }
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, RunOptions::default())
    } else {
        println!("\n~ armlet v{VERSION} ~");
        println!("{}", LOGO.truecolor(255, 183, 197).bold());
        println!("{SHORT_INFO}");
        Ok(())
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &Path, opts: RunOptions) -> Result<()> {
    output::set_minimal(opts.minimal);
    if !opts.minimal {
        file_message(MsgColor::Green, "Assembling", name);
    }
    let src = read_source(name)?;
    let program = assemble(&src)?;

    let mut config = armlet::env::run_config();
    if let Some(memory) = opts.memory {
        config.memory_capacity = memory;
    }
    if opts.max_steps.is_some() {
        config.max_steps = opts.max_steps;
    }
    debug!(?config, "starting run");

    if !opts.minimal {
        let summary = format!("{} instructions", program.air.len());
        message(MsgColor::Green, "Running", &summary);
    }
    let mut state = RunState::new(config);
    let res = state.run(&program, &mut io::stdout().lock());

    if opts.state {
        output::write_state(&state, &mut io::stdout().lock()).into_diagnostic()?;
    }
    // Runtime errors only carry spans
    res.map_err(|err| err.with_source_code(src.clone()))?;

    if !opts.minimal {
        file_message(MsgColor::Green, "Completed", name);
    }
    Ok(())
}

fn read_source(name: &Path) -> Result<String> {
    fs::read_to_string(name)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read `{}`", name.display()))
}

/// Parse a whole source file, failing on the first error
fn assemble(src: &str) -> Result<Program> {
    AsmParser::new(src).parse().into_result()
}

const LOG_VAR: &str = "ARMLET_LOG";

const LOGO: &str = r#"
                          _     _
   __ _   _ __   _ __ ___ | |   ___ | |_
  / _` | | '__| | '_ ` _ \| |  / _ \| __|
 | (_| | | |    | | | | | | | |  __/| |_
  \__,_| |_|    |_| |_| |_|_|  \___| \__|"#;

const SHORT_INFO: &str = r"
Welcome to armlet, an assembler front-end and interpreter for a small
64-bit register machine with 32 registers, flags and byte memory.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
