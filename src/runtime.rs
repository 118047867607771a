use std::io::{self, Write};
use std::iter;

use miette::Result;
use tracing::{debug, error, trace};

use crate::air::{ArithOp, BitOp, Instr, InstrPtr, Operand, Program, ShiftOp};
use crate::error;
use crate::memory::{Memory, OutOfBounds, DEFAULT_MEMORY_CAPACITY};
use crate::span::Span;
use crate::symbol::{Base, Condition, Register};

/// Unresolved branch targets starting with this prefix end the program instead of failing.
/// Compilers emit these for function-local exit labels.
pub const LOCAL_LABEL_PREFIX: &str = ".L";

/// Settings for a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Size of memory in bytes
    pub memory_capacity: usize,
    /// Instruction budget, unbounded if `None`
    pub max_steps: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            max_steps: None,
        }
    }
}

/// Condition flags, set by comparisons.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Flags {
    pub greater: bool,
    pub equal: bool,
    pub less: bool,
}

/// Saved on `call`, restored on `ret`.
struct Frame {
    reg: [i64; Register::COUNT],
    /// Statement after the call, `None` if the call was the last statement
    resume: Option<InstrPtr>,
}

/// Represents complete program state during runtime.
pub struct RunState {
    /// 32x 64-bit registers
    reg: [i64; Register::COUNT],
    flags: Flags,
    stack: Vec<Frame>,
    mem: Memory,
    /// Program counter, `None` once the program has finished
    pc: Option<InstrPtr>,
    steps: u64,
    max_steps: Option<u64>,
    had_error: bool,
}

impl RunState {
    pub fn new(config: RunConfig) -> Self {
        RunState {
            reg: [0; Register::COUNT],
            flags: Flags::default(),
            stack: Vec::new(),
            mem: Memory::new(config.memory_capacity),
            pc: None,
            steps: 0,
            max_steps: config.max_steps,
            had_error: false,
        }
    }

    pub fn reg(&self, reg: Register) -> i64 {
        self.reg[reg.index()]
    }

    pub fn registers(&self) -> &[i64; Register::COUNT] {
        &self.reg
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn call_depth(&self) -> usize {
        self.stack.len()
    }

    /// Run `program` from its first statement until it falls off the end, returns with an empty
    /// call stack, or fails. Program output goes to `out`.
    ///
    /// Errors carry a label for the failing statement but no source code; attach it with
    /// [`miette::Report::with_source_code`].
    pub fn run<W: Write>(&mut self, program: &Program, out: &mut W) -> Result<()> {
        self.pc = program.air.first();
        let res = loop {
            let Some(ptr) = self.pc else {
                break Ok(());
            };
            if let Some(limit) = self.max_steps {
                if self.steps >= limit {
                    break Err(error::exec_step_limit(program.air.get(ptr).span, limit));
                }
            }
            self.steps += 1;
            match self.step(program, ptr, out) {
                Ok(next) => self.pc = next,
                Err(err) => break Err(err),
            }
        };

        // Outstanding frames are released however the run ended
        self.stack.clear();
        let res = res.and_then(|()| out.flush().map_err(error::exec_output));
        if res.is_err() {
            self.had_error = true;
        }
        debug!(steps = self.steps, failed = self.had_error, "finished run");
        res
    }

    /// Execute the statement at `ptr`, returning the next one to execute.
    fn step<W: Write>(
        &mut self,
        program: &Program,
        ptr: InstrPtr,
        out: &mut W,
    ) -> Result<Option<InstrPtr>> {
        let stmt = program.air.get(ptr);
        let span = stmt.span;
        let next = program.air.next(ptr);
        trace!(%ptr, instr = %stmt.instr, depth = self.stack.len(), "step");

        match &stmt.instr {
            Instr::Mov { dest, imm } => self.set(*dest, *imm),
            Instr::Arith { op, dest, lhs, rhs } => {
                let a = self.reg(*lhs) as u64;
                let b = self.fetch(*rhs) as u64;
                let res = match op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                };
                self.set(*dest, res as i64);
            }
            Instr::Compare { unsigned, lhs, rhs } => {
                let a = self.reg(*lhs);
                let b = self.fetch(*rhs);
                let greater = if *unsigned {
                    (a as u64) > (b as u64)
                } else {
                    a > b
                };
                let equal = a == b;
                self.flags = Flags {
                    greater,
                    equal,
                    less: !(greater || equal),
                };
            }
            Instr::Print { value, base } => {
                let value = self.fetch(*value);
                self.print(value, *base, span, out)?;
            }
            Instr::Bitwise { op, dest, lhs, rhs } => {
                let a = self.reg(*lhs);
                let b = self.reg(*rhs);
                let res = match op {
                    BitOp::And => a & b,
                    BitOp::Eor => a ^ b,
                    BitOp::Orr => a | b,
                };
                self.set(*dest, res);
            }
            Instr::Shift {
                op,
                dest,
                src,
                amount,
            } => {
                let amount = self.fetch(*amount);
                if !(0..=63).contains(&amount) {
                    return Err(error::exec_shift_amount(span, amount));
                }
                let val = self.reg(*src);
                let res = match op {
                    ShiftOp::Lsl => val << amount,
                    ShiftOp::Lsr => ((val as u64) >> amount) as i64,
                    ShiftOp::Asr => val >> amount,
                };
                self.set(*dest, res);
            }
            Instr::Load { dest, size, offset } => {
                let offset = self.fetch(*offset);
                // Cleared even if the load fails
                self.set(*dest, 0);
                if !(0..=8).contains(size) {
                    return Err(error::exec_memory_size(span, *size, "0 to 8"));
                }
                let mut buf = [0u8; 8];
                self.mem
                    .load(offset, &mut buf[..*size as usize])
                    .map_err(|err| error::exec_memory_bounds(span, err))?;
                self.set(*dest, i64::from_le_bytes(buf));
            }
            Instr::Store { src, size, offset } => {
                let offset = self.fetch(*offset);
                if !matches!(size, 1 | 2 | 4 | 8) {
                    return Err(error::exec_memory_size(span, *size, "1, 2, 4 or 8"));
                }
                let bytes = self.reg(*src).to_le_bytes();
                self.mem
                    .store(offset, &bytes[..*size as usize])
                    .map_err(|err| error::exec_memory_bounds(span, err))?;
            }
            Instr::Put { text, offset } => {
                let offset = self.fetch(*offset);
                // Byte by byte; whatever was written before a failure stays written
                for (i, byte) in text.bytes().chain(iter::once(0)).enumerate() {
                    self.mem
                        .store(offset.saturating_add(i as i64), &[byte])
                        .map_err(|err| error::exec_memory_bounds(span, err))?;
                }
            }
            Instr::Branch { cond, target } => {
                if !self.cond_holds(*cond) {
                    return Ok(next);
                }
                return match program.labels.lookup(target) {
                    Some(dest) => Ok(Some(dest)),
                    None if target.starts_with(LOCAL_LABEL_PREFIX) => {
                        debug!(label = %target, "branch to unresolved local label, stopping");
                        Ok(None)
                    }
                    None => {
                        error!(label = %target, "label not found");
                        Err(error::exec_label_not_found(span, target))
                    }
                };
            }
            Instr::Call { target } => {
                let Some(dest) = program.labels.lookup(target) else {
                    error!(label = %target, "label not found");
                    return Err(error::exec_label_not_found(span, target));
                };
                self.stack.push(Frame {
                    reg: self.reg,
                    resume: next,
                });
                return Ok(Some(dest));
            }
            Instr::Ret => {
                let Some(frame) = self.stack.pop() else {
                    return Ok(None);
                };
                // x0 carries the return value out
                self.reg[1..].copy_from_slice(&frame.reg[1..]);
                return Ok(frame.resume);
            }
        }
        Ok(next)
    }

    fn set(&mut self, reg: Register, val: i64) {
        self.reg[reg.index()] = val;
    }

    fn fetch(&self, op: Operand) -> i64 {
        match op {
            Operand::Reg(reg) => self.reg(reg),
            Operand::Imm(val) => val,
        }
    }

    fn cond_holds(&self, cond: Condition) -> bool {
        let Flags {
            greater,
            equal,
            less,
        } = self.flags;
        match cond {
            Condition::Always => true,
            Condition::Eq => equal,
            Condition::Ne => !equal,
            Condition::Gt => greater,
            Condition::Ge => greater || equal,
            Condition::Lt => less,
            Condition::Le => less || equal,
        }
    }

    fn print<W: Write>(&self, value: i64, base: Base, span: Span, out: &mut W) -> Result<()> {
        let res = match base {
            Base::Dec => writeln!(out, "{value}"),
            Base::Hex => writeln!(out, "{:#x}", value as u64),
            Base::Bin => writeln!(out, "{:#b}", value as u64),
            Base::Str => {
                let text = self.read_str(value, span)?;
                writeln!(out, "{}", String::from_utf8_lossy(&text))
            }
        };
        res.map_err(error::exec_output)
    }

    /// Read a null-terminated string, at most one byte shorter than memory.
    fn read_str(&self, offset: i64, span: Span) -> Result<Vec<u8>> {
        let limit = self.mem.capacity().saturating_sub(1);
        let mut text = Vec::new();
        for i in 0..limit {
            let mut byte = [0u8];
            let addr = offset.checked_add(i as i64).ok_or(OutOfBounds {
                offset,
                len: i + 1,
                capacity: self.mem.capacity(),
            });
            addr.and_then(|addr| self.mem.load(addr, &mut byte))
                .map_err(|err| error::exec_memory_bounds(span, err))?;
            if byte[0] == 0 {
                break;
            }
            text.push(byte[0]);
        }
        Ok(text)
    }

    /// Plain dump of the error flag, condition flags and registers.
    pub fn write_state<W: Write>(&self, f: &mut W) -> io::Result<()> {
        writeln!(f, "Error: {}", self.had_error as u8)?;
        writeln!(f, "Flags:")?;
        writeln!(f, "Is greater: {}", self.flags.greater as u8)?;
        writeln!(f, "Is equal: {}", self.flags.equal as u8)?;
        writeln!(f, "Is less: {}", self.flags.less as u8)?;
        writeln!(f)?;
        writeln!(f, "Variable values:")?;
        for (i, val) in self.reg.iter().enumerate() {
            write!(f, "x{i}: {val}")?;
            if i < Register::COUNT - 1 {
                write!(f, ", ")?;
            }
            if (i + 1) % 8 == 0 {
                writeln!(f)?;
            }
        }
        writeln!(f)
    }
}

impl Default for RunState {
    fn default() -> Self {
        RunState::new(RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code_of;
    use crate::parser::AsmParser;

    struct Outcome {
        state: RunState,
        output: String,
        error: Option<String>,
    }

    fn run_with(src: &str, config: RunConfig) -> Outcome {
        let program = AsmParser::new(src).parse().into_result().unwrap();
        let mut state = RunState::new(config);
        let mut out = Vec::new();
        let res = state.run(&program, &mut out);
        Outcome {
            state,
            output: String::from_utf8(out).unwrap(),
            error: res.err().map(|err| code_of(&err).unwrap()),
        }
    }

    fn run(src: &str) -> Outcome {
        run_with(src, RunConfig::default())
    }

    fn x(i: usize) -> Register {
        Register::new(i).unwrap()
    }

    #[test]
    fn add_and_print() {
        let res = run("mov x0 5\nmov x1 3\nadd x2 x0 x1\nprint x2 d");
        assert_eq!(res.output, "8\n");
        assert_eq!(res.error, None);
        assert!(!res.state.had_error());
        assert_eq!(res.state.reg(x(2)), 8);
    }

    #[test]
    fn store_then_load() {
        let res = run("mov x0 255\nstore x0 0 8\nload x1 8 0");
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(1)), 255);
    }

    #[test]
    fn little_endian() {
        let res = run(
            "mov x0 0x1234\nstore x0 0 2\nload x1 1 0\nload x2 1 1\n\
             mov x3 -1\nstore x3 8 8\nload x4 4 8\nload x5 0 8",
        );
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(1)), 0x34);
        assert_eq!(res.state.reg(x(2)), 0x12);
        // No sign extension on partial loads
        assert_eq!(res.state.reg(x(4)), 0xffff_ffff);
        assert_eq!(res.state.reg(x(5)), 0);
    }

    #[test]
    fn wrapping_arithmetic() {
        let res = run(
            "mov x0 0x7FFFFFFFFFFFFFFF\nadd x1 x0 1\nsub x2 x1 1\n\
             mov x3 0xffffffffffffffff\nadd x4 x3 1\nsub x5 x4 x3",
        );
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(1)), i64::MIN);
        assert_eq!(res.state.reg(x(2)), i64::MAX);
        assert_eq!(res.state.reg(x(3)), -1);
        assert_eq!(res.state.reg(x(4)), 0);
        assert_eq!(res.state.reg(x(5)), 1);
    }

    #[test]
    fn bitwise() {
        let res = run("mov x0 0b1100\nmov x1 0b1010\nand x2 x0 x1\neor x3 x0 x1\norr x4 x0 x1");
        assert_eq!(res.state.reg(x(2)), 0b1000);
        assert_eq!(res.state.reg(x(3)), 0b0110);
        assert_eq!(res.state.reg(x(4)), 0b1110);
    }

    #[test]
    fn shifts() {
        let res = run("mov x0 -16\nlsr x1 x0 60\nasr x2 x0 2\nlsl x3 x0 1\nmov x4 1\nlsl x5 x4 63");
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(1)), 15);
        assert_eq!(res.state.reg(x(2)), -4);
        assert_eq!(res.state.reg(x(3)), -32);
        assert_eq!(res.state.reg(x(5)), i64::MIN);
    }

    #[test]
    fn shift_bounds() {
        assert_eq!(run("lsl x1 x0 63").error, None);
        assert_eq!(run("lsl x1 x0 64").error.as_deref(), Some("exec::shift_amount"));
        assert_eq!(run("asr x1 x0 -1").error.as_deref(), Some("exec::shift_amount"));
        let res = run("mov x2 64\nmov x3 9\nlsr x1 x0 x2\nmov x3 1");
        assert_eq!(res.error.as_deref(), Some("exec::shift_amount"));
        assert!(res.state.had_error());
        // Nothing after the failure ran
        assert_eq!(res.state.reg(x(3)), 9);
    }

    #[test]
    fn compare_flags() {
        let res = run("mov x0 -1\ncmp x0 1");
        assert_eq!(
            res.state.flags(),
            Flags {
                greater: false,
                equal: false,
                less: true
            }
        );
        let res = run("mov x0 -1\ncmp_u x0 1");
        assert_eq!(
            res.state.flags(),
            Flags {
                greater: true,
                equal: false,
                less: false
            }
        );
        let res = run("mov x0 7\ncmp_u x0 7");
        assert_eq!(
            res.state.flags(),
            Flags {
                greater: false,
                equal: true,
                less: false
            }
        );
    }

    #[test]
    fn conditional_branches() {
        let cases = [
            ("b.eq", 3, 3, true),
            ("b.eq", 3, 4, false),
            ("b.ne", 3, 4, true),
            ("b.gt", 4, 3, true),
            ("b.gt", 3, 3, false),
            ("b.ge", 3, 3, true),
            ("b.lt", -5, 3, true),
            ("b.lt", 3, 3, false),
            ("b.le", 3, 3, true),
            ("b.le", 4, 3, false),
        ];
        for (branch, a, b, taken) in cases {
            let src = format!("mov x0 {a}\ncmp x0 {b}\n{branch} skip\nmov x1 1\nskip: mov x2 1");
            let res = run(&src);
            assert_eq!(res.error, None);
            assert_eq!(res.state.reg(x(1)) == 0, taken, "{branch} {a} {b}");
            assert_eq!(res.state.reg(x(2)), 1);
        }
    }

    #[test]
    fn counting_loop() {
        let src = "
            mov x0 0
            mov x1 1
        loop:
            add x0 x0 x1
            add x1 x1 1
            cmp x1 10
            b.le loop
            print x0 d
        ";
        let res = run(src);
        assert_eq!(res.output, "55\n");
    }

    #[test]
    fn local_label_ends_program() {
        let res = run("mov x0 1\nb .L3\nmov x0 2");
        assert_eq!(res.error, None);
        assert!(!res.state.had_error());
        assert_eq!(res.state.reg(x(0)), 1);
    }

    #[test]
    fn missing_label() {
        let res = run("mov x0 1\nb nowhere\nmov x0 2");
        assert_eq!(res.error.as_deref(), Some("exec::label_not_found"));
        assert!(res.state.had_error());
        assert_eq!(res.state.reg(x(0)), 1);
        // Only the `.L` prefix is special
        assert_eq!(
            run("b L3").error.as_deref(),
            Some("exec::label_not_found")
        );
        assert_eq!(
            run("call .L3").error.as_deref(),
            Some("exec::label_not_found")
        );
    }

    #[test]
    fn untaken_branch_is_not_resolved() {
        let res = run("mov x0 1\ncmp x0 2\nb.eq nowhere\nmov x1 2");
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(1)), 2);
    }

    #[test]
    fn ret_without_call_ends_program() {
        let res = run("mov x0 1\nret\nmov x0 2");
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(0)), 1);
    }

    #[test]
    fn return_value_survives_ret() {
        let src = "
            mov x0 1
            mov x5 5
            call f
            print x0 d
            print x5 d
            ret
        f:
            mov x0 42
            mov x5 0
            ret
        ";
        let res = run(src);
        assert_eq!(res.output, "42\n5\n");
        assert_eq!(res.state.call_depth(), 0);
    }

    #[test]
    fn nested_calls_restore_registers() {
        const DEPTH: usize = 4;
        let mut src = String::new();
        for i in 1..32 {
            src.push_str(&format!("mov x{i} {}\n", i * 100));
        }
        src.push_str("call f0\nret\n");
        for level in 0..DEPTH {
            src.push_str(&format!("f{level}:\n"));
            for i in 1..32 {
                src.push_str(&format!("mov x{i} {}\n", -(level as i64) - 1));
            }
            src.push_str(&format!("mov x0 {level}\n"));
            if level + 1 < DEPTH {
                src.push_str(&format!("call f{}\n", level + 1));
            }
            src.push_str("ret\n");
        }
        let res = run(&src);
        assert_eq!(res.error, None);
        for i in 1..32 {
            assert_eq!(res.state.reg(x(i)), (i * 100) as i64, "x{i}");
        }
        // Last write to x0 came from the innermost callee
        assert_eq!(res.state.reg(x(0)), (DEPTH - 1) as i64);
    }

    #[test]
    fn recursion() {
        let src = "
            mov x1 5
            call sum
            print x0 d
            ret
        sum:
            cmp x1 0
            b.gt recurse
            mov x0 0
            ret
        recurse:
            sub x1 x1 1
            call sum
            add x1 x1 1
            add x0 x0 x1
            ret
        ";
        let res = run(src);
        assert_eq!(res.output, "15\n");
        assert_eq!(res.state.reg(x(1)), 5);
    }

    #[test]
    fn call_as_last_statement() {
        let res = run("b start\nf: mov x0 3\nret\nstart: call f");
        assert_eq!(res.error, None);
        assert_eq!(res.state.reg(x(0)), 3);
    }

    #[test]
    fn print_formats() {
        let res = run(
            "print 0 b\nmov x0 -1\nprint x0 x\nprint 5 b\nprint x0 d\nprint 255 x\nprint 0 x",
        );
        assert_eq!(res.output, "0b0\n0xffffffffffffffff\n0b101\n-1\n0xff\n0x0\n");
    }

    #[test]
    fn put_and_print_string() {
        let res = run("put \"hello\" 10\nprint 10 s\nmov x3 12\nprint x3 s\nload x4 1 15");
        assert_eq!(res.error, None);
        assert_eq!(res.output, "hello\nllo\n");
        // Terminator was written
        assert_eq!(res.state.reg(x(4)), 0);
    }

    #[test]
    fn print_string_needs_terminator_in_bounds() {
        let config = RunConfig {
            memory_capacity: 4,
            ..RunConfig::default()
        };
        // Reads stop one byte short of capacity
        let res = run_with("mov x0 0x41414141\nstore x0 0 4\nprint 0 s", config);
        assert_eq!(res.error, None);
        assert_eq!(res.output, "AAA\n");
        let res = run_with("mov x0 0x41414141\nstore x0 0 4\nprint 2 s", config);
        assert_eq!(res.error.as_deref(), Some("exec::memory_bounds"));
        assert_eq!(run_with("print -1 s", config).error.as_deref(), Some("exec::memory_bounds"));
    }

    #[test]
    fn put_partial_write() {
        let config = RunConfig {
            memory_capacity: 8,
            ..RunConfig::default()
        };
        let res = run_with("put \"abcdefghij\" 4", config);
        assert_eq!(res.error.as_deref(), Some("exec::memory_bounds"));
        let mut buf = [0u8; 4];
        res.state.memory().load(4, &mut buf).unwrap();
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn load_errors() {
        let res = run("mov x1 7\nload x1 9 0");
        assert_eq!(res.error.as_deref(), Some("exec::memory_size"));
        assert_eq!(res.state.reg(x(1)), 0);
        let res = run("mov x1 7\nload x1 8 1020");
        assert_eq!(res.error.as_deref(), Some("exec::memory_bounds"));
        assert_eq!(res.state.reg(x(1)), 0);
        assert_eq!(run("load x1 8 1016").error, None);
        assert_eq!(run("load x1 1 -1").error.as_deref(), Some("exec::memory_bounds"));
    }

    #[test]
    fn store_errors() {
        assert_eq!(run("store x0 0 3").error.as_deref(), Some("exec::memory_size"));
        assert_eq!(run("store x0 0 0").error.as_deref(), Some("exec::memory_size"));
        assert_eq!(run("store x0 1020 8").error.as_deref(), Some("exec::memory_bounds"));
        assert_eq!(run("store x0 1016 8").error, None);
        assert_eq!(run("mov x1 -8\nstore x0 x1 8").error.as_deref(), Some("exec::memory_bounds"));
    }

    #[test]
    fn step_limit() {
        let config = RunConfig {
            max_steps: Some(50),
            ..RunConfig::default()
        };
        let res = run_with("loop: call f\nf: b loop", config);
        assert_eq!(res.error.as_deref(), Some("exec::step_limit"));
        assert_eq!(res.state.steps(), 50);
        assert_eq!(res.state.call_depth(), 0);

        let res = run_with("mov x0 1\nret", config);
        assert_eq!(res.error, None);
        assert_eq!(res.state.steps(), 2);
    }

    #[test]
    fn frames_released_on_error() {
        let res = run("call f\nret\nf: call g\ng: b missing");
        assert_eq!(res.error.as_deref(), Some("exec::label_not_found"));
        assert_eq!(res.state.call_depth(), 0);
    }

    #[test]
    fn empty_program() {
        let res = run("");
        assert_eq!(res.error, None);
        assert_eq!(res.state.steps(), 0);
    }

    #[test]
    fn state_dump() {
        let res = run("mov x0 3\nmov x9 -2\nmov x31 7\ncmp x0 3");
        let mut out = Vec::new();
        res.state.write_state(&mut out).unwrap();
        let expected = concat!(
            "Error: 0\nFlags:\nIs greater: 0\nIs equal: 1\nIs less: 0\n\n",
            "Variable values:\n",
            "x0: 3, x1: 0, x2: 0, x3: 0, x4: 0, x5: 0, x6: 0, x7: 0, \n",
            "x8: 0, x9: -2, x10: 0, x11: 0, x12: 0, x13: 0, x14: 0, x15: 0, \n",
            "x16: 0, x17: 0, x18: 0, x19: 0, x20: 0, x21: 0, x22: 0, x23: 0, \n",
            "x24: 0, x25: 0, x26: 0, x27: 0, x28: 0, x29: 0, x30: 0, x31: 7\n",
            "\n",
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn state_dump_after_error() {
        let res = run("b missing");
        let mut out = Vec::new();
        res.state.write_state(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Error: 1\n"));
    }
}
