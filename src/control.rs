//! The control unit: instruction fetch, decode and execution.
//!
//! Every instruction is processed in a single fetch-decode-execute cycle.
//! The fetch costs two ticks (latch `dr` from `pc`, read the cell). A
//! control-flow instruction then latches `pc` directly for one more tick.
//! Any other instruction runs its fixed sequence of micro-steps, one tick
//! each, and finally latches `pc + 1` for one extra tick.

use std::fmt;

use crate::datapath::DataPath;
use crate::isa::{Opcode, Reg, Word};
use crate::Value;

/// Why a simulation run came to an end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// A `HALT` instruction was executed.
    Halted,
    /// The instruction-count limit was reached.
    LimitExceeded,
    /// A `READ` found its input port empty.
    InputExhausted,
    /// A `DIV` had a zero divisor.
    DivisionByZero,
    /// An instruction carried arguments its opcode cannot use.
    InvalidInstruction,
}

/// Outcome of [`ControlUnit::run`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RunSummary {
    pub status: Status,
    pub instr_count: u64,
    pub ticks: u64,
}

pub struct ControlUnit {
    data_path: DataPath,
    tick: u64,
}

impl ControlUnit {
    pub fn new(data_path: DataPath) -> ControlUnit {
        ControlUnit { data_path, tick: 0 }
    }

    fn tick(&mut self) {
        self.tick += 1;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn data_path(&self) -> &DataPath {
        &self.data_path
    }

    fn fetch_instruction(&mut self) -> Word {
        let addr = self.data_path.load_reg(Reg::PC);
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let instr = self
            .data_path
            .memory_perform(true, false, 0)
            .unwrap_or_else(|| Word::padding(addr as u32));
        self.tick();
        instr
    }

    /// Executes one full instruction. `None` means the machine keeps going.
    pub fn step(&mut self) -> Option<Status> {
        let instr = self.fetch_instruction();

        match instr.opcode {
            Opcode::Halt => return Some(Status::Halted),
            Opcode::Jump => {
                let Some(target) = instr.arg1.imm() else {
                    return Some(Status::InvalidInstruction);
                };
                self.data_path.latch_reg(Reg::PC, target);
                self.tick();
                return None;
            }
            Opcode::Je | Opcode::Jne | Opcode::Jl | Opcode::Jle | Opcode::Jg | Opcode::Jge => {
                let Some(target) = instr.arg1.imm() else {
                    return Some(Status::InvalidInstruction);
                };
                let zero = self.data_path.zero();
                let neg = self.data_path.neg();
                let taken = match instr.opcode {
                    Opcode::Je => zero,
                    Opcode::Jne => !zero,
                    Opcode::Jl => neg,
                    Opcode::Jle => neg || zero,
                    Opcode::Jg => !neg && !zero,
                    Opcode::Jge => !neg || zero,
                    _ => unreachable!(),
                };
                let next = if taken {
                    target
                } else {
                    self.data_path.load_reg(Reg::PC) + 1
                };
                self.data_path.latch_reg(Reg::PC, next);
                self.tick();
                return None;
            }
            _ => {}
        }

        let stop = match instr.opcode {
            Opcode::LdAddr => self.ld_addr(&instr),
            Opcode::LdLit => self.ld_lit(&instr),
            Opcode::Ld => self.ld(&instr),
            Opcode::LdStack => self.ld_stack(&instr),
            Opcode::StAddr => self.st_addr(&instr),
            Opcode::St => self.st(&instr),
            Opcode::StStack => self.st_stack(&instr),
            Opcode::Mv => self.mv(&instr),
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor => self.arithmetic(&instr),
            Opcode::Inc | Opcode::Dec | Opcode::Neg => self.unary(&instr),
            Opcode::AddLit => self.add_lit(&instr),
            Opcode::Cmp => self.compare(&instr),
            Opcode::Push => self.push(&instr),
            Opcode::Pop => self.pop(&instr),
            Opcode::Read => self.read(&instr),
            Opcode::Print => self.print(&instr),
            Opcode::Halt
            | Opcode::Jump
            | Opcode::Je
            | Opcode::Jne
            | Opcode::Jl
            | Opcode::Jle
            | Opcode::Jg
            | Opcode::Jge => unreachable!(),
        };
        if stop.is_some() {
            return stop;
        }

        let pc = self.data_path.load_reg(Reg::PC);
        self.data_path.latch_reg(Reg::PC, pc + 1);
        self.tick();
        None
    }

    fn ld_addr(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(addr)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        self.data_path.latch_reg(Reg::DR, addr);
        let data = self.read_cell();
        self.tick();
        self.data_path.latch_reg(reg, data);
        self.tick();
        None
    }

    fn ld_lit(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(value)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        self.data_path.latch_reg(reg, value);
        self.tick();
        None
    }

    fn ld(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg_to), Some(reg_from)) = (instr.arg1.reg(), instr.arg2.reg()) else {
            return Some(Status::InvalidInstruction);
        };
        let addr = self.pass_through(reg_from);
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.read_cell();
        self.data_path.latch_reg(reg_to, data);
        self.tick();
        None
    }

    fn ld_stack(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(k)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        let addr = self.data_path.mem_size() as Value - k - 1;
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.read_cell();
        self.data_path.latch_reg(reg, data);
        self.tick();
        None
    }

    fn st_addr(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(addr)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.pass_through(reg);
        self.tick();
        self.data_path.memory_perform(false, true, data);
        self.tick();
        None
    }

    fn st(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(addr_reg)) = (instr.arg1.reg(), instr.arg2.reg()) else {
            return Some(Status::InvalidInstruction);
        };
        let addr = self.pass_through(addr_reg);
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.pass_through(reg);
        self.tick();
        self.data_path.memory_perform(false, true, data);
        self.tick();
        None
    }

    fn st_stack(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(k)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        let addr = self.data_path.mem_size() as Value - k - 1;
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.pass_through(reg);
        self.data_path.memory_perform(false, true, data);
        self.tick();
        None
    }

    fn mv(&mut self, instr: &Word) -> Option<Status> {
        let (Some(src), Some(dst)) = (instr.arg1.reg(), instr.arg2.reg()) else {
            return Some(Status::InvalidInstruction);
        };
        let data = self.pass_through(src);
        self.tick();
        self.data_path.latch_reg(dst, data);
        self.tick();
        None
    }

    fn arithmetic(&mut self, instr: &Word) -> Option<Status> {
        let (Some(r1), Some(r2)) = (instr.arg1.reg(), instr.arg2.reg()) else {
            return Some(Status::InvalidInstruction);
        };
        let lhs = self.data_path.load_reg(r1);
        let rhs = self.data_path.load_reg(r2);
        if instr.opcode == Opcode::Div && rhs == 0 {
            return Some(Status::DivisionByZero);
        }
        let result = self.data_path.perform_arithmetic(instr.opcode, lhs, rhs);
        self.tick();
        self.data_path.latch_reg(r1, result);
        self.tick();
        None
    }

    fn unary(&mut self, instr: &Word) -> Option<Status> {
        let Some(reg) = instr.arg1.reg() else {
            return Some(Status::InvalidInstruction);
        };
        let value = self.data_path.load_reg(reg);
        let result = self.data_path.perform_arithmetic(instr.opcode, value, 0);
        self.tick();
        self.data_path.latch_reg(reg, result);
        self.tick();
        None
    }

    fn add_lit(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(value)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        let lhs = self.data_path.load_reg(reg);
        let result = self.data_path.perform_arithmetic(Opcode::AddLit, lhs, value);
        self.tick();
        self.data_path.latch_reg(reg, result);
        self.tick();
        None
    }

    fn compare(&mut self, instr: &Word) -> Option<Status> {
        let (Some(r1), Some(r2)) = (instr.arg1.reg(), instr.arg2.reg()) else {
            return Some(Status::InvalidInstruction);
        };
        let lhs = self.data_path.load_reg(r1);
        let rhs = self.data_path.load_reg(r2);
        self.data_path.perform_arithmetic(Opcode::Sub, lhs, rhs);
        self.tick();
        None
    }

    fn push(&mut self, instr: &Word) -> Option<Status> {
        let Some(reg) = instr.arg1.reg() else {
            return Some(Status::InvalidInstruction);
        };
        let addr = self.pass_through(Reg::SP);
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.pass_through(reg);
        self.tick();
        self.data_path.memory_perform(false, true, data);
        self.tick();
        let sp = self.data_path.load_reg(Reg::SP);
        let next = self.data_path.perform_arithmetic(Opcode::Dec, sp, 0);
        self.tick();
        self.data_path.latch_reg(Reg::SP, next);
        self.tick();
        None
    }

    fn pop(&mut self, instr: &Word) -> Option<Status> {
        let Some(reg) = instr.arg1.reg() else {
            return Some(Status::InvalidInstruction);
        };
        let sp = self.data_path.load_reg(Reg::SP);
        let next = self.data_path.perform_arithmetic(Opcode::Inc, sp, 0);
        self.tick();
        self.data_path.latch_reg(Reg::SP, next);
        self.tick();
        let sp = self.data_path.load_reg(Reg::SP);
        let addr = self.data_path.perform_arithmetic(Opcode::Add, sp, 0);
        self.tick();
        self.data_path.latch_reg(Reg::DR, addr);
        self.tick();
        let data = self.read_cell();
        self.data_path.latch_reg(reg, data);
        self.tick();
        None
    }

    fn read(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(port)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        if !self.data_path.has_input(port) {
            return Some(Status::InputExhausted);
        }
        let data = self.data_path.pick_char(port);
        self.data_path.latch_reg(reg, data);
        self.tick();
        None
    }

    fn print(&mut self, instr: &Word) -> Option<Status> {
        let (Some(reg), Some(port)) = (instr.arg1.reg(), instr.arg2.imm()) else {
            return Some(Status::InvalidInstruction);
        };
        let data = self.pass_through(reg);
        self.tick();
        self.data_path.put_char(data, port);
        self.tick();
        None
    }

    /// Routes a register value through the ALU as `0 + x`, the bus move of
    /// this machine. Updates the flags as a side effect.
    fn pass_through(&mut self, reg: Reg) -> Value {
        let value = self.data_path.load_reg(reg);
        self.data_path.perform_arithmetic(Opcode::Add, 0, value)
    }

    /// Reads the cell addressed by `dr` as data.
    fn read_cell(&mut self) -> Value {
        self.data_path
            .memory_perform(true, false, 0)
            .map(|word| word.value())
            .unwrap_or(0)
    }

    /// Runs until a termination condition, executing at most `limit`
    /// instructions.
    pub fn run(&mut self, limit: u64) -> RunSummary {
        let mut instr_count = 0;
        log::debug!("{}", self);
        let status = loop {
            if instr_count >= limit {
                break Status::LimitExceeded;
            }
            match self.step() {
                Some(status) => break status,
                None => {
                    instr_count += 1;
                    log::debug!("{}", self);
                }
            }
        };
        match status {
            Status::Halted => {}
            Status::LimitExceeded => log::warn!("Limit exceeded!"),
            Status::InputExhausted => log::warn!("Input buffer is empty!"),
            Status::DivisionByZero => log::warn!("Division by zero!"),
            Status::InvalidInstruction => log::warn!("Invalid instruction!"),
        }
        log::info!("output_buffer: {:?}", self.data_path.output(0));
        RunSummary {
            status,
            instr_count,
            ticks: self.tick,
        }
    }
}

impl fmt::Display for ControlUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pc = self.data_path.load_reg(Reg::PC);
        write!(
            f,
            "TICK: {:4} PC: {:4} reg: {:?}",
            self.tick,
            pc,
            self.data_path.registers()
        )?;
        if let Some(word) = self.data_path.word_at(pc as usize) {
            write!(f, " \t('{}' @ {})", word.index, word)?;
        }
        Ok(())
    }
}

/// Prepares the machine and runs the simulation, returning the port-0
/// output together with the instruction and tick counters.
pub fn simulation(memory: Vec<Word>, input_tokens: Vec<char>, limit: u64) -> (String, u64, u64) {
    let data_path = DataPath::new(memory, input_tokens);
    let mut control_unit = ControlUnit::new(data_path);
    let summary = control_unit.run(limit);
    (
        control_unit.data_path().output(0),
        summary.instr_count,
        summary.ticks,
    )
}
