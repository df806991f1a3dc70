//! Text image format for [tcpu](../tcpu/index.html) machine code.
//!
//! An image is a UTF-8 document holding a bracketed, comma-separated list of
//! instruction records in stable field order, one record per line:
//!
//! ```text
//! [{"index":0,"opcode":"LD_LIT","arg1":"r9","arg2":5},
//!  {"index":1,"opcode":"HALT","arg1":null,"arg2":null}]
//! ```
//!
//! [`write_code`] serialises an instruction list and refuses to emit any
//! word still carrying a symbolic address. [`read_code`] parses a document
//! back, checks that every record sits at its own index, and pads the result
//! with `JUMP 0` words up to the requested memory size, so that a loaded
//! image backs every addressable cell.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tcpu::{pad_image, Word};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A word still carries an unresolved symbolic argument.
    Unresolved(u32),
    /// A record's index does not match its position in the list.
    BadIndex { expected: u32, found: u32 },
    /// More records than the memory has cells.
    TooLarge(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "image I/O failed: {}", err),
            Error::Json(err) => write!(f, "malformed image: {}", err),
            Error::Unresolved(index) => {
                write!(f, "unresolved address in instruction {}", index)
            }
            Error::BadIndex { expected, found } => {
                write!(f, "instruction {} recorded with index {}", expected, found)
            }
            Error::TooLarge(len) => write!(f, "image of {} cells does not fit memory", len),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

pub fn write_code<W: Write>(writer: &mut W, code: &[Word]) -> Result<(), Error> {
    let mut records = Vec::with_capacity(code.len());
    for word in code {
        if word.arg1.is_symbolic() || word.arg2.is_symbolic() {
            return Err(Error::Unresolved(word.index));
        }
        records.push(serde_json::to_string(word)?);
    }
    write!(writer, "[{}]", records.join(",\n "))?;
    Ok(())
}

pub fn read_code<R: Read>(reader: &mut R, mem_size: usize) -> Result<Vec<Word>, Error> {
    let code: Vec<Word> = serde_json::from_reader(reader)?;
    if code.len() > mem_size {
        return Err(Error::TooLarge(code.len()));
    }
    for (position, word) in code.iter().enumerate() {
        if word.index as usize != position {
            return Err(Error::BadIndex {
                expected: position as u32,
                found: word.index,
            });
        }
    }
    Ok(pad_image(code, mem_size))
}

pub trait ReadImageExt: Read + Sized {
    fn read_image(&mut self, mem_size: usize) -> Result<Vec<Word>, Error> {
        read_code(self, mem_size)
    }
}

impl<R: Read + Sized> ReadImageExt for R {}

pub trait WriteImageExt: Write + Sized {
    fn write_image(&mut self, code: &[Word]) -> Result<(), Error> {
        write_code(self, code)
    }
}

impl<W: Write + Sized> WriteImageExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P, mem_size: usize) -> Result<Vec<Word>, Error> {
    BufReader::new(File::open(path)?).read_image(mem_size)
}

pub fn write_file<P: AsRef<Path>>(path: P, code: &[Word]) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_image(code)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test;
