//! Running machine images on the simulated processor.
//!
//! The functions here cover both halves of the toolchain: [`run_image_file`]
//! executes an already translated image, while [`run_source`] pushes source
//! text through the whole pipeline (translate, serialise, load, simulate),
//! which is also how the end-to-end tests drive it.

use std::path::{Path, PathBuf};

use tcpu::constants::MEM_SIZE;
use tcpu::{ControlUnit, DataPath, RunSummary, Word};
use timage::{ReadImageExt, WriteImageExt};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error, PathBuf),
    Image(timage::Error),
    Translate(tlc::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => {
                write!(f, "Reading file \"{}\" failed: {}", path.display(), err)
            }
            Error::Image(err) => write!(f, "{}", err),
            Error::Translate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<timage::Error> for Error {
    fn from(err: timage::Error) -> Error {
        Error::Image(err)
    }
}

impl From<tlc::Error> for Error {
    fn from(err: tlc::Error) -> Error {
        Error::Translate(err)
    }
}

/// Runs a loaded memory image with the given input characters queued on
/// port 0. Returns the machine for inspection along with the run summary.
pub fn run_code(memory: Vec<Word>, input: &str, limit: u64) -> (ControlUnit, RunSummary) {
    let data_path = DataPath::new(memory, input.chars().collect());
    let mut control_unit = ControlUnit::new(data_path);
    let summary = control_unit.run(limit);
    (control_unit, summary)
}

/// Reads an image file and an input file, then simulates.
pub fn run_image_file(
    image: &Path,
    input_file: &Path,
    mem_size: usize,
    limit: u64,
) -> Result<(ControlUnit, RunSummary), Error> {
    let memory = timage::read_file(image, mem_size)?;
    log::debug!("loaded image {}", image.display());
    let input = std::fs::read_to_string(input_file)
        .map_err(|err| Error::Io(err, input_file.to_owned()))?;
    Ok(run_code(memory, &input, limit))
}

/// Translates source text and runs it, round-tripping the image through
/// the serialised format on the way.
pub fn run_source(
    source: &str,
    input: &str,
    limit: u64,
) -> Result<(ControlUnit, RunSummary), Error> {
    let code = tlc::translate(source)?;
    let mut image = Vec::new();
    image.write_image(&code)?;
    let memory = image.as_slice().read_image(MEM_SIZE)?;
    Ok(run_code(memory, input, limit))
}
