//! The lexer.

use derive_more::Display;
use regex::Regex;

/// One token of source text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
#[display("{kind} '{text}'")]
pub struct Token<'src> {
    /// What token class this token belongs to.
    pub kind: TokenKind,
    /// What part of the input this token carries. String literals are
    /// stored with the quotes already stripped.
    pub text: &'src str,
}

/// Token classes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum TokenKind {
    #[display("if")]
    If,
    #[display("while")]
    While,
    #[display("read")]
    Read,
    #[display("print_str")]
    PrintStr,
    #[display("print_int")]
    PrintInt,
    #[display("let")]
    Let,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display(">=")]
    Ge,
    #[display("<=")]
    Le,
    #[display(">")]
    Gt,
    #[display("<")]
    Lt,
    #[display("=")]
    Assign,
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("*")]
    Star,
    #[display("/")]
    Slash,
    #[display("(")]
    LParen,
    #[display(")")]
    RParen,
    #[display("{{")]
    LBrace,
    #[display("}}")]
    RBrace,
    #[display(";")]
    Semicolon,
    #[display("string")]
    Str,
    #[display("number")]
    Num,
    #[display("name")]
    Name,
}

pub struct LexError(pub usize, pub char);

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Lexer error: unexpected character {:?} at {}",
            self.1, self.0
        )
    }
}

impl std::fmt::Debug for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

pub struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    whitespace: Regex,
    matchers: Vec<(Regex, TokenKind)>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        use TokenKind::*;

        // Order matters: keywords before names, multi-character operators
        // before their one-character prefixes, numbers before names.
        let table: &[(&str, TokenKind)] = &[
            (r"\Aif\b", If),
            (r"\Awhile\b", While),
            (r"\Aread\b", Read),
            (r"\Aprint_str\b", PrintStr),
            (r"\Aprint_int\b", PrintInt),
            (r"\Alet\b", Let),
            (r"\A==", Eq),
            (r"\A!=", Ne),
            (r"\A>=", Ge),
            (r"\A<=", Le),
            (r"\A>", Gt),
            (r"\A<", Lt),
            (r"\A=", Assign),
            (r"\A\+", Plus),
            (r"\A-", Minus),
            (r"\A\*", Star),
            (r"\A/", Slash),
            (r"\A\(", LParen),
            (r"\A\)", RParen),
            (r"\A\{", LBrace),
            (r"\A\}", RBrace),
            (r"\A;", Semicolon),
            (r#"\A"[0-9a-zA-Z ]+""#, Str),
            (r"\A-?[0-9]+", Num),
            (r"\A[a-zA-Z0-9]+", Name),
        ];

        Lexer {
            input,
            pos: 0,
            whitespace: Regex::new(r"\A[ \t\f\r\n\v]*").unwrap(),
            matchers: table
                .iter()
                .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), *kind))
                .collect(),
        }
    }

    /// Has the lexer reached the end of input?
    pub fn end_of_input(&self) -> bool {
        self.pos == self.input.len()
    }

    fn skip_whitespace(&mut self) {
        if let Some(m) = self.whitespace.find(&self.input[self.pos..]) {
            self.pos += m.end()
        }
    }

    /// Get the next token if possible.
    ///
    /// The return type distinguishes between end-of-input and lexer error.
    pub fn next_token(&mut self) -> Result<Option<Token<'input>>, LexError> {
        self.skip_whitespace();
        if self.end_of_input() {
            return Ok(None);
        }
        for (matcher, kind) in &self.matchers {
            if let Some(m) = matcher.find(&self.input[self.pos..]) {
                let mut text = &self.input[self.pos..self.pos + m.end()];
                self.pos += m.end();
                if *kind == TokenKind::Str {
                    text = &text[1..text.len() - 1];
                }
                return Ok(Some(Token { kind: *kind, text }));
            }
        }
        let unexpected = self.input[self.pos..].chars().next().unwrap_or('\0');
        Err(LexError(self.pos, unexpected))
    }
}

/// Lexes the whole input into a token list.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
