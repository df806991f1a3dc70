//! Instruction set of the machine: opcodes, register tags, instruction
//! arguments and the instruction word itself.
//!
//! Every instruction occupies exactly one memory cell and is kept as a
//! `{index, opcode, arg1, arg2}` record; `index` always equals the cell's
//! address. The same record doubles as a data cell: the resolve pass of the
//! code generator appends data as `JUMP value` pseudo-words, and a store
//! rewrites a cell's first argument in place.

use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Value;

/// Machine operations. Serialised names are the wire mnemonics
/// (`LD_ADDR`, `ADD_LIT`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    //  Mnemonic | Arguments        | Effect
    // ----------+------------------+---------------------------------------
    // Control   |                  |
    Halt,   //   |                  | Stops the machine
    Jump,   //   | addr             | pc = addr
    Je,     //   | addr             | pc = addr if zero
    Jne,    //   | addr             | pc = addr if !zero
    Jl,     //   | addr             | pc = addr if neg
    Jle,    //   | addr             | pc = addr if neg || zero
    Jg,     //   | addr             | pc = addr if !neg && !zero
    Jge,    //   | addr             | pc = addr if !neg || zero
    Cmp,    //   | r1, r2           | flags of r1 - r2, result discarded
    // Data      |                  |
    LdAddr, //   | r, addr          | r = MEM[addr]
    Ld,     //   | r_to, r_from     | r_to = MEM[r_from]
    LdStack, //  | r, k             | r = MEM[mem_size - k - 1]
    LdLit,  //   | r, imm           | r = imm
    StAddr, //   | r, addr          | MEM[addr] = r
    St,     //   | r, r_addr        | MEM[r_addr] = r
    StStack, //  | r, k             | MEM[mem_size - k - 1] = r
    Mv,     //   | r_src, r_dst     | r_dst = r_src
    // Arithmetic|                  |
    Add,    //   | r1, r2           | r1 = r1 + r2
    Sub,    //   | r1, r2           | r1 = r1 - r2
    Mul,    //   | r1, r2           | r1 = r1 * r2
    Div,    //   | r1, r2           | r1 = r1 / r2 (toward zero)
    Inc,    //   | r                | r = r + 1
    Dec,    //   | r                | r = r - 1
    AddLit, //   | r, imm           | r = r + imm
    Shl,    //   | r1, r2           | r1 = r1 << r2
    Shr,    //   | r1, r2           | r1 = r1 >> r2
    And,    //   | r1, r2           | r1 = r1 & r2
    Or,     //   | r1, r2           | r1 = r1 | r2
    Xor,    //   | r1, r2           | r1 = r1 ^ r2
    Neg,    //   | r                | r = !r
    // Stack     |                  |
    Push,   //   | r                | MEM[sp] = r; sp = sp - 1
    Pop,    //   | r                | sp = sp + 1; r = MEM[sp]
    // I/O       |                  |
    Read,   //   | r, port          | r = next character of the input port
    Print,  //   | r, port          | append character r to the output port
}

/// Register tags `r0`..`r15`.
///
/// `r13`..`r15` are architectural ([`Reg::PC`], [`Reg::DR`], [`Reg::SP`]);
/// the rest are general purpose. Generated code caches variables in
/// `r1`..`r8` and uses `r9`..`r12` as evaluation and loop scratch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl Reg {
    /// Program counter.
    pub const PC: Reg = Reg::R13;
    /// Memory data/address register, the bus latch of the control unit.
    pub const DR: Reg = Reg::R14;
    /// Stack pointer; grows downward from the top of memory.
    pub const SP: Reg = Reg::R15;

    /// All registers, in register-file order.
    pub const ALL: [Reg; 16] = [
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
        Reg::R4,
        Reg::R5,
        Reg::R6,
        Reg::R7,
        Reg::R8,
        Reg::R9,
        Reg::R10,
        Reg::R11,
        Reg::R12,
        Reg::R13,
        Reg::R14,
        Reg::R15,
    ];

    /// Position of the register in the register file.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.index())
    }
}

/// Error returned when a string is not a register tag.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseRegError(pub String);

impl fmt::Display for ParseRegError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "not a register tag: {:?}", self.0)
    }
}

impl std::error::Error for ParseRegError {}

impl FromStr for Reg {
    type Err = ParseRegError;

    fn from_str(s: &str) -> Result<Reg, ParseRegError> {
        s.strip_prefix('r')
            .and_then(|num| num.parse::<usize>().ok())
            .and_then(|index| Reg::ALL.get(index).copied())
            .ok_or_else(|| ParseRegError(s.to_string()))
    }
}

/// One argument of an instruction word.
///
/// [`Arg::Label`] and [`Arg::Data`] exist only while code is being
/// generated; the resolve pass rewrites both to concrete addresses, and the
/// image serialiser rejects them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Arg {
    #[default]
    None,
    Reg(Reg),
    Imm(Value),
    /// Address of the I/O scratch buffer (`static_mem_start`).
    Label,
    /// Data-section-relative address, rebased by the resolve pass.
    Data(u32),
}

impl Arg {
    pub fn reg(&self) -> Option<Reg> {
        match self {
            Arg::Reg(reg) => Some(*reg),
            _ => None,
        }
    }

    pub fn imm(&self) -> Option<Value> {
        match self {
            Arg::Imm(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the argument still carries a generation-time address.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Arg::Label | Arg::Data(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arg::None => f.write_str("-"),
            Arg::Reg(reg) => reg.fmt(f),
            Arg::Imm(value) => value.fmt(f),
            Arg::Label => f.write_str("static_mem_start"),
            Arg::Data(offset) => write!(f, "data+{}", offset),
        }
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::None => serializer.serialize_unit(),
            Arg::Reg(reg) => serializer.collect_str(reg),
            Arg::Imm(value) => serializer.serialize_i32(*value),
            Arg::Label | Arg::Data(_) => Err(ser::Error::custom("unresolved address argument")),
        }
    }
}

impl<'de> Deserialize<'de> for Arg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Arg, D::Error> {
        struct ArgVisitor;

        impl<'de> de::Visitor<'de> for ArgVisitor {
            type Value = Arg;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("null, an integer or a register tag")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Arg, E> {
                Ok(Arg::None)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Arg, E> {
                Value::try_from(value)
                    .map(Arg::Imm)
                    .map_err(|_| E::custom(format!("argument out of range: {}", value)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Arg, E> {
                Value::try_from(value)
                    .map(Arg::Imm)
                    .map_err(|_| E::custom(format!("argument out of range: {}", value)))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Arg, E> {
                value.parse().map(Arg::Reg).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(ArgVisitor)
    }
}

/// One instruction word, also serving as a memory cell.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Word {
    pub index: u32,
    pub opcode: Opcode,
    #[serde(default)]
    pub arg1: Arg,
    #[serde(default)]
    pub arg2: Arg,
}

impl Word {
    pub fn new(index: u32, opcode: Opcode, arg1: Arg, arg2: Arg) -> Word {
        Word {
            index,
            opcode,
            arg1,
            arg2,
        }
    }

    /// The `JUMP 0` word that backs every otherwise unoccupied memory cell.
    pub fn padding(index: u32) -> Word {
        Word::new(index, Opcode::Jump, Arg::Imm(0), Arg::None)
    }

    /// The cell interpreted as data: its first argument, or 0.
    pub fn value(&self) -> Value {
        self.arg1.imm().unwrap_or(0)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {} {}", self.opcode, self.arg1, self.arg2)
    }
}

/// Extends a code image with `JUMP 0` padding words up to `mem_size` cells.
pub fn pad_image(mut code: Vec<Word>, mem_size: usize) -> Vec<Word> {
    for index in code.len()..mem_size {
        code.push(Word::padding(index as u32));
    }
    code
}
