//! The passive side of the machine: ALU, register file, memory and ports.
//!
//! Nothing here sequences itself; the control unit pulls the levers
//! (`latch_reg`, `memory_perform`, `perform_arithmetic`, ...) and accounts
//! for the ticks.

use std::collections::{HashMap, VecDeque};

use crate::constants::REGISTER_COUNT;
use crate::isa::{Arg, Opcode, Reg, Word};
use crate::Value;

/// Arithmetic unit.
///
/// Results wrap to 32 bits. Every operation sets `zero` and `neg`; addition
/// and subtraction (including `INC`/`DEC` and `ADD_LIT`) additionally raise
/// `carry` on signed overflow.
pub struct Alu {
    zero: bool,
    neg: bool,
    carry: bool,
}

impl Alu {
    pub fn new() -> Alu {
        Alu {
            zero: false,
            neg: false,
            carry: false,
        }
    }

    pub fn zero(&self) -> bool {
        self.zero
    }

    pub fn neg(&self) -> bool {
        self.neg
    }

    pub fn carry(&self) -> bool {
        self.carry
    }

    /// Executes an arithmetic opcode. The caller guards division by zero.
    pub fn execute(&mut self, opcode: Opcode, arg1: Value, arg2: Value) -> Value {
        let wide = match opcode {
            Opcode::Add | Opcode::AddLit => i64::from(arg1) + i64::from(arg2),
            Opcode::Sub => i64::from(arg1) - i64::from(arg2),
            Opcode::Mul => i64::from(arg1) * i64::from(arg2),
            Opcode::Div => i64::from(arg1.wrapping_div(arg2)),
            Opcode::Inc => i64::from(arg1) + 1,
            Opcode::Dec => i64::from(arg1) - 1,
            Opcode::Shl => i64::from(arg1) << (arg2 & 31),
            Opcode::Shr => i64::from(arg1 >> (arg2 & 31)),
            Opcode::And => i64::from(arg1 & arg2),
            Opcode::Or => i64::from(arg1 | arg2),
            Opcode::Xor => i64::from(arg1 ^ arg2),
            Opcode::Neg => i64::from(!arg1),
            _ => unreachable!("not an ALU opcode: {:?}", opcode),
        };
        self.set_flags(opcode, wide)
    }

    fn set_flags(&mut self, opcode: Opcode, wide: i64) -> Value {
        let value = wide as Value;
        self.carry = matches!(
            opcode,
            Opcode::Add | Opcode::AddLit | Opcode::Sub | Opcode::Inc | Opcode::Dec
        ) && i64::from(value) != wide;
        self.neg = value < 0;
        self.zero = value == 0;
        value
    }
}

impl Default for Alu {
    fn default() -> Alu {
        Alu::new()
    }
}

/// Register file, memory and port queues.
///
/// Input ports are FIFOs consumed one character per `READ`; output ports
/// collect one character per `PRINT`. The memory is the loaded instruction
/// array; a store rewrites the addressed cell's first argument in place.
pub struct DataPath {
    mem_size: usize,
    memory: Vec<Word>,
    registers: [Value; REGISTER_COUNT],
    alu: Alu,
    input_ports: HashMap<Value, VecDeque<char>>,
    output_ports: HashMap<Value, Vec<char>>,
}

impl DataPath {
    /// Builds a data path around a loaded memory image, queueing
    /// `input_tokens` on input port 0.
    pub fn new(memory: Vec<Word>, input_tokens: Vec<char>) -> DataPath {
        let mem_size = memory.len();
        let mut registers = [0; REGISTER_COUNT];
        registers[Reg::SP.index()] = mem_size as Value - 1;

        let mut input_ports = HashMap::new();
        input_ports.insert(0, VecDeque::from(input_tokens));
        let mut output_ports = HashMap::new();
        output_ports.insert(0, Vec::new());

        DataPath {
            mem_size,
            memory,
            registers,
            alu: Alu::new(),
            input_ports,
            output_ports,
        }
    }

    pub fn mem_size(&self) -> usize {
        self.mem_size
    }

    pub fn memory(&self) -> &[Word] {
        &self.memory
    }

    pub fn word_at(&self, address: usize) -> Option<&Word> {
        self.memory.get(address)
    }

    pub fn latch_reg(&mut self, reg: Reg, value: Value) {
        self.registers[reg.index()] = value;
    }

    pub fn load_reg(&self, reg: Reg) -> Value {
        self.registers[reg.index()]
    }

    pub fn registers(&self) -> &[Value] {
        &self.registers
    }

    /// One memory bus cycle on the cell addressed by `dr`: `oe` reads the
    /// cell, `wr` overwrites its data argument.
    pub fn memory_perform(&mut self, oe: bool, wr: bool, data: Value) -> Option<Word> {
        let address = self.load_reg(Reg::DR) as usize;
        if oe {
            return self.memory.get(address).cloned();
        }
        if wr {
            if let Some(cell) = self.memory.get_mut(address) {
                cell.arg1 = Arg::Imm(data);
            }
        }
        None
    }

    pub fn perform_arithmetic(&mut self, opcode: Opcode, arg1: Value, arg2: Value) -> Value {
        self.alu.execute(opcode, arg1, arg2)
    }

    pub fn zero(&self) -> bool {
        self.alu.zero()
    }

    pub fn neg(&self) -> bool {
        self.alu.neg()
    }

    pub fn carry(&self) -> bool {
        self.alu.carry()
    }

    pub fn has_input(&self, port: Value) -> bool {
        self.input_ports
            .get(&port)
            .map(|queue| !queue.is_empty())
            .unwrap_or(false)
    }

    /// Pops the next character of an input port; 0 when the port is empty.
    pub fn pick_char(&mut self, port: Value) -> Value {
        self.input_ports
            .get_mut(&port)
            .and_then(|queue| queue.pop_front())
            .map(|ch| ch as Value)
            .unwrap_or(0)
    }

    /// Appends a character to an output port.
    pub fn put_char(&mut self, ch: Value, port: Value) {
        let ch = char::from_u32(ch as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
        self.output_ports.entry(port).or_default().push(ch);
    }

    /// Everything printed to an output port so far.
    pub fn output(&self, port: Value) -> String {
        self.output_ports
            .get(&port)
            .map(|chars| chars.iter().collect())
            .unwrap_or_default()
    }
}
