//! The translator binary: reads source text, writes the serialised image.

use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Debug)]
enum IOErrorContext {
    ReadSource,
    WriteImage,
}

#[derive(Debug)]
enum Error {
    Translate(tlc::Error),
    Image(timage::Error),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadSource => "Reading source",
                    IOErrorContext::WriteImage => "Writing image",
                },
                path.display(),
                err
            ),
            Error::Translate(err) => write!(f, "{}", err),
            Error::Image(err) => write!(f, "{}", err),
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Translate source text into a machine-code image")]
struct Args {
    /// The source file to translate
    source: PathBuf,
    /// The image file to write
    image: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = translate_file(&args.source, &args.image) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn translate_file(source: &Path, image: &Path) -> Result<(), Error> {
    let text = std::fs::read_to_string(source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadSource, source.to_owned()))?;

    let code = tlc::translate(&text).map_err(Error::Translate)?;
    log::debug!("translated {} source bytes into {} cells", text.len(), code.len());

    timage::write_file(image, &code).map_err(|err| match err {
        timage::Error::Io(io) => Error::Io(io, IOErrorContext::WriteImage, image.to_owned()),
        other => Error::Image(other),
    })
}
