//! Translator for a tiny imperative source language targeting the
//! [tcpu](../tcpu/index.html) machine.
//!
//! The pipeline is `source text -> tokens -> AST -> instruction list`:
//! the `lex` and `parse` modules build the tree, `codegen` lowers it into
//! a resolved machine-code image ready for
//! [timage](../timage/index.html) serialisation.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lex;
pub mod parse;


pub use codegen::generate;
pub use error::Error;
pub use parse::parse;

use tcpu::Word;

/// Translates source text into a machine-code image.
pub fn translate(source: &str) -> Result<Vec<Word>, Error> {
    let program = parse(source)?;
    Ok(generate(&program)?)
}
