//! Tick-accurate model of a small register machine with memory-mapped I/O
//! ports, together with the instruction set it executes.
//!
//! The machine is built from a passive [`DataPath`] (register file, ALU,
//! word-addressed memory and character port queues) driven by a
//! [`ControlUnit`] that fetches, decodes and executes one instruction at a
//! time while accounting for every micro-step in a tick counter.
//!
//! Memory holds [`isa::Word`] records rather than packed bits; a program
//! image occupies the low addresses, followed by a reserved I/O scratch
//! buffer, statically allocated data and `JUMP 0` padding into which the
//! stack grows downward.

pub mod constants;
pub mod control;
pub mod datapath;
pub mod isa;

/// Value held by a register or a memory cell, as seen by the ALU.
pub type Value = i32;

pub use control::{simulation, ControlUnit, RunSummary, Status};
pub use datapath::{Alu, DataPath};
pub use isa::{pad_image, Arg, Opcode, Reg, Word};
