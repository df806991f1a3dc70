//! The abstract syntax tree.

/// A parsed source program: the statements of the root block.
#[derive(Debug, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
pub enum Stmt {
    Let { name: String, value: Operand },
    Assign { name: String, value: Operand },
    If { cmp: Comparison, body: Vec<Stmt> },
    While { cmp: Comparison, body: Vec<Stmt> },
    PrintInt(MathExpr),
    PrintStr(PrintArg),
}

/// Right-hand side of a `let` or an assignment.
#[derive(Debug, PartialEq)]
pub enum Operand {
    /// A string literal, stored length-prefixed in the data section.
    Str(String),
    /// `read()`: one zero-terminated line from input port 0.
    Read,
    Math(MathExpr),
}

/// What `print_str` can print.
#[derive(Debug, PartialEq)]
pub enum PrintArg {
    Name(String),
    Literal(String),
}

#[derive(Debug, PartialEq)]
pub struct Comparison {
    pub op: CmpOp,
    pub lhs: MathExpr,
    pub rhs: MathExpr,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, PartialEq)]
pub enum MathExpr {
    Num(i32),
    Var(String),
    Bin {
        op: BinOp,
        lhs: Box<MathExpr>,
        rhs: Box<MathExpr>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
