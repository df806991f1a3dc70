//! The emulator binary: runs an image against an input file and prints the
//! port-0 output followed by the instruction and tick counters.

use std::path::PathBuf;

use clap::Parser;

use tcpu::constants::{DEFAULT_LIMIT, MEM_SIZE};

#[derive(Debug, Parser)]
#[command(version, about = "Run a machine-code image on the simulated processor")]
struct Args {
    /// The image file to run
    image: PathBuf,
    /// The file whose characters are queued on input port 0
    input: PathBuf,
    /// Memory size of the simulated machine, in cells
    #[arg(long, default_value_t = MEM_SIZE)]
    memory: usize,
    /// Maximum number of instructions to execute
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match trun::run_image_file(&args.image, &args.input, args.memory, args.limit) {
        Ok((control_unit, summary)) => {
            println!("{}", control_unit.data_path().output(0));
            println!(
                "instr_counter: {} ticks: {}",
                summary.instr_count, summary.ticks
            );
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
