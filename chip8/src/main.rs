use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use emu8::constants::DEFAULT_CLOCK_SPEED;

mod run;

/// Runs a Chip-8 program headlessly, pacing one cycle per clock period.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the program image
    rom: PathBuf,

    /// Stop after this many cycles instead of running forever
    #[arg(short, long)]
    cycles: Option<u64>,

    /// Nanoseconds per cycle
    #[arg(long, default_value_t = DEFAULT_CLOCK_SPEED)]
    clock_speed: u64,

    /// Ignore the clock speed and run as fast as possible
    #[arg(short, long)]
    fast: bool,

    /// Seed for the random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Hex digits of keys held down for the whole run, e.g. `5a`
    #[arg(short, long, value_parser = run::parse_keys)]
    keys: Option<[bool; 16]>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = run::Config {
        cycles: args.cycles,
        clock_speed: args.clock_speed,
        fast: args.fast,
        seed: args.seed,
        keys: args.keys.unwrap_or([false; 16]),
    };
    run::run(&args.rom, &config)
}
