//! Errors of the three translation stages. Every failure is fatal for its
//! stage; no partial image is ever produced.

use derive_more::Display;

use crate::codegen::GenError;
use crate::lex::LexError;
use crate::parse::ParseError;

#[derive(Debug, Display)]
pub enum Error {
    #[display("{_0}")]
    Lex(LexError),
    #[display("{_0}")]
    Parse(ParseError),
    #[display("{_0}")]
    Gen(GenError),
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(err: LexError) -> Error {
        Error::Lex(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<GenError> for Error {
    fn from(err: GenError) -> Error {
        Error::Gen(err)
    }
}
