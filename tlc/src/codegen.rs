//! Lowering of the AST into machine code.
//!
//! The generator appends instructions to a growing list whose indices are
//! final addresses, collects statically allocated data in a side list, and
//! finishes with a single resolve pass that reserves the 32-cell I/O
//! buffer, rewrites every generation-time address to a concrete one and
//! appends the data cells as `JUMP value` pseudo-words. The produced image
//! therefore reads, in address order: code, I/O buffer, data.
//!
//! Variables live in data cells; an integer variable stores its value
//! inline, a string variable stores the address of a separately allocated
//! length-prefixed character run. Expressions are evaluated on the emulated
//! stack with `r9`/`r10` as scratch; `r11`/`r12` drive the inline I/O
//! loops; recently used variables are cached in `r1`..`r8`.

use std::collections::HashMap;

use derive_more::Display;

use tcpu::constants::{IO_BUFFER_SIZE, MEM_SIZE};
use tcpu::{Arg, Opcode, Reg, Value, Word};

use crate::ast::*;

#[derive(Clone, PartialEq, Eq, Debug, Display)]
pub enum GenError {
    #[display("use of undeclared variable '{_0}'")]
    Undeclared(String),
    #[display("redeclaration of variable '{_0}'")]
    Redeclared(String),
    #[display("program does not fit into memory: {_0} cells")]
    TooLarge(usize),
}

impl std::error::Error for GenError {}

/// Lowers a program into a resolved instruction list.
pub fn generate(program: &Program) -> Result<Vec<Word>, GenError> {
    let mut gen = Generator::new();
    for stmt in &program.stmts {
        gen.statement(stmt)?;
    }
    gen.push_instruction(Opcode::Halt, Arg::None, Arg::None);
    gen.resolve()?;
    Ok(gen.code)
}

struct Generator {
    code: Vec<Word>,
    /// Next free data cell, relative to the start of the data section.
    current_offset: u32,
    variables: HashMap<String, u32>,
    /// Pending data cells, appended to the image by the resolve pass.
    static_mem: Vec<Value>,
    var_to_reg: HashMap<String, Reg>,
    reg_to_var: HashMap<Reg, String>,
    reg_counter: usize,
}

impl Generator {
    fn new() -> Generator {
        Generator {
            code: Vec::new(),
            current_offset: 0,
            variables: HashMap::new(),
            static_mem: Vec::new(),
            var_to_reg: HashMap::new(),
            reg_to_var: HashMap::new(),
            reg_counter: 1,
        }
    }

    fn current_address(&self) -> u32 {
        self.code.len() as u32
    }

    fn push_instruction(&mut self, opcode: Opcode, arg1: Arg, arg2: Arg) -> u32 {
        let index = self.current_address();
        self.code.push(Word::new(index, opcode, arg1, arg2));
        index
    }

    fn push_data(&mut self, value: Value) {
        self.static_mem.push(value);
        self.current_offset += 1;
    }

    /// Appends a length-prefixed string to the data section, returning the
    /// offset of its length cell.
    fn push_string(&mut self, text: &str) -> u32 {
        let offset = self.current_offset;
        self.push_data(text.chars().count() as Value);
        for ch in text.chars() {
            self.push_data(ch as Value);
        }
        offset
    }

    /// Allocates one zero-initialised data cell.
    fn push_int_cell(&mut self) -> u32 {
        let offset = self.current_offset;
        self.push_data(0);
        offset
    }

    fn variable_offset(&self, name: &str) -> Result<u32, GenError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| GenError::Undeclared(name.to_string()))
    }

    // Register cache. The round-robin picker wraps within r1..r8; whoever
    // held the picked register loses it.

    fn take_register(&mut self) -> Reg {
        self.reg_counter += 1;
        if self.reg_counter >= 9 {
            self.reg_counter = 1;
        }
        let reg = Reg::ALL[self.reg_counter];
        if let Some(var) = self.reg_to_var.remove(&reg) {
            self.var_to_reg.remove(&var);
        }
        reg
    }

    /// The register holding the variable's value, loading it if necessary.
    fn load_variable(&mut self, name: &str) -> Result<Reg, GenError> {
        if let Some(&reg) = self.var_to_reg.get(name) {
            return Ok(reg);
        }
        let offset = self.variable_offset(name)?;
        let reg = self.take_register();
        self.push_instruction(Opcode::LdAddr, Arg::Reg(reg), Arg::Data(offset));
        self.var_to_reg.insert(name.to_string(), reg);
        self.reg_to_var.insert(reg, name.to_string());
        Ok(reg)
    }

    fn forget_variable(&mut self, name: &str) {
        if let Some(reg) = self.var_to_reg.remove(name) {
            self.reg_to_var.remove(&reg);
        }
    }

    fn drop_register_cache(&mut self) {
        self.var_to_reg.clear();
        self.reg_to_var.clear();
    }

    // Statements.

    fn statement(&mut self, stmt: &Stmt) -> Result<(), GenError> {
        match stmt {
            Stmt::Let { name, value } => self.let_binding(name, value),
            Stmt::Assign { name, value } => self.assign(name, value),
            Stmt::If { cmp, body } => self.conditional(cmp, body, false),
            Stmt::While { cmp, body } => self.conditional(cmp, body, true),
            Stmt::PrintInt(expr) => self.print_int(expr),
            Stmt::PrintStr(arg) => self.print_str(arg),
        }
    }

    fn let_binding(&mut self, name: &str, value: &Operand) -> Result<(), GenError> {
        if self.variables.contains_key(name) {
            return Err(GenError::Redeclared(name.to_string()));
        }
        let offset = self.push_int_cell();
        self.variables.insert(name.to_string(), offset);
        self.assign(name, value)
    }

    fn assign(&mut self, name: &str, value: &Operand) -> Result<(), GenError> {
        let offset = self.variable_offset(name)?;
        match value {
            Operand::Str(text) => {
                let addr = self.push_string(text);
                self.store_literal(Arg::Data(addr), offset);
            }
            Operand::Read => {
                self.read_line();
                self.store_literal(Arg::Label, offset);
            }
            Operand::Math(expr) => {
                self.math(expr)?;
                self.push_instruction(Opcode::StAddr, Arg::Reg(Reg::R9), Arg::Data(offset));
            }
        }
        self.forget_variable(name);
        Ok(())
    }

    /// `LD_LIT tmp, value; ST_ADDR tmp, var` for a value known at
    /// generation time (a data address or the I/O buffer label).
    fn store_literal(&mut self, value: Arg, var_offset: u32) {
        let reg = self.take_register();
        self.push_instruction(Opcode::LdLit, Arg::Reg(reg), value);
        self.push_instruction(Opcode::StAddr, Arg::Reg(reg), Arg::Data(var_offset));
    }

    // Expressions.

    /// Evaluates the expression on the emulated stack and pops the result
    /// into `r9`.
    fn math(&mut self, expr: &MathExpr) -> Result<(), GenError> {
        self.math_rec(expr)?;
        self.push_instruction(Opcode::Pop, Arg::Reg(Reg::R9), Arg::None);
        Ok(())
    }

    fn math_rec(&mut self, expr: &MathExpr) -> Result<(), GenError> {
        match expr {
            MathExpr::Num(value) => {
                self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R9), Arg::Imm(*value));
                self.push_instruction(Opcode::Push, Arg::Reg(Reg::R9), Arg::None);
            }
            MathExpr::Var(name) => {
                let reg = self.load_variable(name)?;
                self.push_instruction(Opcode::Mv, Arg::Reg(reg), Arg::Reg(Reg::R9));
                self.push_instruction(Opcode::Push, Arg::Reg(Reg::R9), Arg::None);
            }
            MathExpr::Bin { op, lhs, rhs } => {
                self.math_rec(lhs)?;
                self.math_rec(rhs)?;
                self.push_instruction(Opcode::Pop, Arg::Reg(Reg::R10), Arg::None);
                self.push_instruction(Opcode::Pop, Arg::Reg(Reg::R9), Arg::None);
                self.push_instruction(bin_opcode(*op), Arg::Reg(Reg::R9), Arg::Reg(Reg::R10));
                self.push_instruction(Opcode::Push, Arg::Reg(Reg::R9), Arg::None);
            }
        }
        Ok(())
    }

    // Control flow.

    fn conditional(&mut self, cmp: &Comparison, body: &[Stmt], looping: bool) -> Result<(), GenError> {
        self.drop_register_cache();
        let loop_head = self.current_address();

        match self.comparison_operand(&cmp.lhs)? {
            Some(offset) => {
                self.push_instruction(Opcode::LdAddr, Arg::Reg(Reg::R12), Arg::Data(offset));
            }
            None => {
                self.push_instruction(Opcode::Mv, Arg::Reg(Reg::R9), Arg::Reg(Reg::R12));
            }
        }
        if let Some(offset) = self.comparison_operand(&cmp.rhs)? {
            self.push_instruction(Opcode::LdAddr, Arg::Reg(Reg::R9), Arg::Data(offset));
        }
        self.push_instruction(Opcode::Cmp, Arg::Reg(Reg::R12), Arg::Reg(Reg::R9));

        // Inverted condition skips the block; the target is patched once
        // the block (and the backward jump of a loop) is in place.
        let branch = self.push_instruction(inverted(branch_opcode(cmp.op)), Arg::Imm(-1), Arg::None);

        for stmt in body {
            self.statement(stmt)?;
        }
        if looping {
            self.push_instruction(Opcode::Jump, Arg::Imm(loop_head as Value), Arg::None);
        }
        let target = self.current_address();
        self.code[branch as usize].arg1 = Arg::Imm(target as Value);

        // Registers loaded inside the block are unreliable after it: the
        // branch may have skipped the loads.
        self.drop_register_cache();
        Ok(())
    }

    /// A bare variable yields its data cell; anything else is evaluated on
    /// the stack, leaving its value in `r9`.
    fn comparison_operand(&mut self, expr: &MathExpr) -> Result<Option<u32>, GenError> {
        match expr {
            MathExpr::Var(name) => self.variable_offset(name).map(Some),
            _ => {
                self.math(expr)?;
                Ok(None)
            }
        }
    }

    // I/O.

    fn print_int(&mut self, expr: &MathExpr) -> Result<(), GenError> {
        self.math(expr)?;
        self.push_instruction(Opcode::Print, Arg::Reg(Reg::R9), Arg::Imm(0));
        Ok(())
    }

    /// Emits the counted loop printing a length-prefixed string: `r10`/`r11`
    /// walk the length cell and the characters, `r9` holds the length and
    /// `r10` is reused as the character counter.
    fn print_str(&mut self, arg: &PrintArg) -> Result<(), GenError> {
        match arg {
            PrintArg::Name(name) => {
                // The variable's cell holds the string's base address.
                let offset = self.variable_offset(name)?;
                self.push_instruction(Opcode::LdAddr, Arg::Reg(Reg::R10), Arg::Data(offset));
                self.push_instruction(Opcode::LdAddr, Arg::Reg(Reg::R11), Arg::Data(offset));
            }
            PrintArg::Literal(text) => {
                let addr = self.push_string(text);
                self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R10), Arg::Data(addr));
                self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R11), Arg::Data(addr));
            }
        }
        self.push_instruction(Opcode::Inc, Arg::Reg(Reg::R11), Arg::None);
        self.push_instruction(Opcode::Ld, Arg::Reg(Reg::R9), Arg::Reg(Reg::R10));
        self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R10), Arg::Imm(0));
        let loop_head = self.current_address();
        self.push_instruction(Opcode::Cmp, Arg::Reg(Reg::R9), Arg::Reg(Reg::R10));
        self.push_instruction(Opcode::Je, Arg::Imm((loop_head + 7) as Value), Arg::None);
        self.push_instruction(Opcode::Ld, Arg::Reg(Reg::R12), Arg::Reg(Reg::R11));
        self.push_instruction(Opcode::Print, Arg::Reg(Reg::R12), Arg::Imm(0));
        self.push_instruction(Opcode::AddLit, Arg::Reg(Reg::R10), Arg::Imm(1));
        self.push_instruction(Opcode::AddLit, Arg::Reg(Reg::R11), Arg::Imm(1));
        self.push_instruction(Opcode::Jump, Arg::Imm(loop_head as Value), Arg::None);
        Ok(())
    }

    /// Emits the inline input loop: characters are read from port 0 into
    /// the I/O buffer until a zero byte, then the count is stored as the
    /// buffer's length prefix.
    fn read_line(&mut self) {
        self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R11), Arg::Imm(0));
        self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R10), Arg::Imm(0));
        self.push_instruction(Opcode::LdLit, Arg::Reg(Reg::R12), Arg::Label);
        let loop_head = self.current_address();
        self.push_instruction(Opcode::Read, Arg::Reg(Reg::R9), Arg::Imm(0));
        self.push_instruction(Opcode::Cmp, Arg::Reg(Reg::R9), Arg::Reg(Reg::R10));
        self.push_instruction(Opcode::Je, Arg::Imm((loop_head + 7) as Value), Arg::None);
        self.push_instruction(Opcode::Inc, Arg::Reg(Reg::R11), Arg::None);
        self.push_instruction(Opcode::Inc, Arg::Reg(Reg::R12), Arg::None);
        self.push_instruction(Opcode::St, Arg::Reg(Reg::R9), Arg::Reg(Reg::R12));
        self.push_instruction(Opcode::Jump, Arg::Imm(loop_head as Value), Arg::None);
        self.push_instruction(Opcode::StAddr, Arg::Reg(Reg::R11), Arg::Label);
    }

    // Resolution.

    /// Reserves the I/O buffer, rewrites symbolic addresses and appends the
    /// data section.
    fn resolve(&mut self) -> Result<(), GenError> {
        let buffer_start = self.current_address();
        for _ in 0..IO_BUFFER_SIZE {
            self.push_instruction(Opcode::Jump, Arg::Imm(0), Arg::None);
        }
        let data_start = self.current_address();
        for word in &mut self.code {
            resolve_arg(&mut word.arg1, buffer_start, data_start);
            resolve_arg(&mut word.arg2, buffer_start, data_start);
        }
        for value in std::mem::take(&mut self.static_mem) {
            self.push_instruction(Opcode::Jump, Arg::Imm(value), Arg::None);
        }
        if self.code.len() > MEM_SIZE {
            return Err(GenError::TooLarge(self.code.len()));
        }
        Ok(())
    }
}

fn resolve_arg(arg: &mut Arg, buffer_start: u32, data_start: u32) {
    match *arg {
        Arg::Label => *arg = Arg::Imm(buffer_start as Value),
        Arg::Data(offset) => *arg = Arg::Imm((data_start + offset) as Value),
        _ => {}
    }
}

fn bin_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Sub => Opcode::Sub,
        BinOp::Mul => Opcode::Mul,
        BinOp::Div => Opcode::Div,
    }
}

fn branch_opcode(op: CmpOp) -> Opcode {
    match op {
        CmpOp::Eq => Opcode::Je,
        CmpOp::Ne => Opcode::Jne,
        CmpOp::Lt => Opcode::Jl,
        CmpOp::Le => Opcode::Jle,
        CmpOp::Gt => Opcode::Jg,
        CmpOp::Ge => Opcode::Jge,
    }
}

fn inverted(opcode: Opcode) -> Opcode {
    match opcode {
        Opcode::Je => Opcode::Jne,
        Opcode::Jne => Opcode::Je,
        Opcode::Jl => Opcode::Jge,
        Opcode::Jge => Opcode::Jl,
        Opcode::Jg => Opcode::Jle,
        Opcode::Jle => Opcode::Jg,
        _ => unreachable!("not a conditional jump: {:?}", opcode),
    }
}
