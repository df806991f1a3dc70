//! The parser: recursive descent over the token list.
//!
//! Statements:
//! `let NAME = operand;` · `NAME = operand;` · `print_int(math);` ·
//! `print_str(NAME|STRING);` · `if(cmp){block}` · `while(cmp){block}`,
//! where `operand` is a string literal, `read()` or a math expression.
//! `*`/`/` bind tighter than `+`/`-`; parentheses group.

use std::fmt::Debug;

use crate::ast::*;
use crate::error::Error;
use crate::lex::{tokenize, Token, TokenKind};

pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.0)
    }
}

impl Debug for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

pub fn parse(input: &str) -> Result<Program, Error> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    Ok(parser.program()?)
}

struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn bump(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        match self.peek() {
            Some(&token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            Some(&token) => Err(ParseError(format!("expected '{}', found {}", kind, token))),
            None => Err(ParseError(format!(
                "expected '{}', found end of input",
                kind
            ))),
        }
    }

    fn program(&mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.statement()?);
        }
        Ok(Program { stmts })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::If) | Some(TokenKind::While) => self.if_or_while(),
            Some(TokenKind::Let) | Some(TokenKind::Name) => self.let_or_assign(),
            Some(TokenKind::PrintStr) | Some(TokenKind::PrintInt) => self.print(),
            Some(_) => {
                let token = self.bump().unwrap();
                Err(ParseError(format!("not a statement: {}", token)))
            }
            None => Err(ParseError("expected a statement".to_string())),
        }
    }

    fn if_or_while(&mut self) -> Result<Stmt, ParseError> {
        let looping = self.peek_kind() == Some(TokenKind::While);
        self.bump();
        self.expect(TokenKind::LParen)?;
        let cmp = self.comparison()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(if looping {
            Stmt::While { cmp, body }
        } else {
            Stmt::If { cmp, body }
        })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::RBrace) => break,
                Some(_) => stmts.push(self.statement()?),
                None => return Err(ParseError("unterminated block".to_string())),
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn let_or_assign(&mut self) -> Result<Stmt, ParseError> {
        let is_let = self.eat(TokenKind::Let);
        let name = self.expect(TokenKind::Name)?.text.to_string();
        self.expect(TokenKind::Assign)?;
        let value = self.operand()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(if is_let {
            Stmt::Let { name, value }
        } else {
            Stmt::Assign { name, value }
        })
    }

    fn operand(&mut self) -> Result<Operand, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Str) => {
                let token = self.bump().unwrap();
                Ok(Operand::Str(token.text.to_string()))
            }
            Some(TokenKind::Read) => {
                self.bump();
                self.expect(TokenKind::LParen)?;
                self.expect(TokenKind::RParen)?;
                Ok(Operand::Read)
            }
            _ => Ok(Operand::Math(self.math_expr()?)),
        }
    }

    fn print(&mut self) -> Result<Stmt, ParseError> {
        let string_print = self.peek_kind() == Some(TokenKind::PrintStr);
        self.bump();
        self.expect(TokenKind::LParen)?;
        let stmt = if string_print {
            match self.peek() {
                Some(token) if token.kind == TokenKind::Name => {
                    let name = token.text.to_string();
                    self.pos += 1;
                    Stmt::PrintStr(PrintArg::Name(name))
                }
                Some(token) if token.kind == TokenKind::Str => {
                    let literal = token.text.to_string();
                    self.pos += 1;
                    Stmt::PrintStr(PrintArg::Literal(literal))
                }
                _ => {
                    return Err(ParseError(
                        "print_str takes a name or a string literal".to_string(),
                    ))
                }
            }
        } else {
            if self.peek_kind() == Some(TokenKind::Str) {
                return Err(ParseError("print_int cannot print a string".to_string()));
            }
            Stmt::PrintInt(self.math_expr()?)
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(stmt)
    }

    fn comparison(&mut self) -> Result<Comparison, ParseError> {
        let lhs = self.math_expr()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => CmpOp::Eq,
            Some(TokenKind::Ne) => CmpOp::Ne,
            Some(TokenKind::Lt) => CmpOp::Lt,
            Some(TokenKind::Le) => CmpOp::Le,
            Some(TokenKind::Gt) => CmpOp::Gt,
            Some(TokenKind::Ge) => CmpOp::Ge,
            _ => return Err(ParseError("expected a comparison operator".to_string())),
        };
        self.bump();
        let rhs = self.math_expr()?;
        Ok(Comparison { op, lhs, rhs })
    }

    fn math_expr(&mut self) -> Result<MathExpr, ParseError> {
        let mut node = self.term()?;
        while let Some(kind) = self.peek_kind() {
            let op = match kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            node = MathExpr::Bin {
                op,
                lhs: Box::new(node),
                rhs: Box::new(self.term()?),
            };
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<MathExpr, ParseError> {
        let mut node = self.factor()?;
        while let Some(kind) = self.peek_kind() {
            let op = match kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            node = MathExpr::Bin {
                op,
                lhs: Box::new(node),
                rhs: Box::new(self.factor()?),
            };
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<MathExpr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Num) => {
                let token = self.bump().unwrap();
                let value = token
                    .text
                    .parse()
                    .map_err(|_| ParseError(format!("number literal out of range: {}", token)))?;
                Ok(MathExpr::Num(value))
            }
            Some(TokenKind::Name) => {
                let token = self.bump().unwrap();
                Ok(MathExpr::Var(token.text.to_string()))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let node = self.math_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            Some(_) => {
                let token = self.bump().unwrap();
                Err(ParseError(format!("expected a value, found {}", token)))
            }
            None => Err(ParseError(
                "expected a value, found end of input".to_string(),
            )),
        }
    }
}
