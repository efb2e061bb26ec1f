use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};

use emu8::{AudioSink, Chip8};

/// How the driver loop paces and feeds the Chip-8
#[derive(Debug, Clone)]
pub struct Config {
    pub cycles: Option<u64>,
    pub clock_speed: u64,
    pub fast: bool,
    pub seed: Option<u64>,
    pub keys: [bool; 16],
}

/// Reports tones through the log instead of a speaker
struct LogBeep {
    beeps: u64,
}

impl AudioSink for LogBeep {
    fn beep(&mut self) {
        self.beeps += 1;
        info!("beep #{}", self.beeps);
    }
}

/// Parses a string of hex digits into the set of held keys
pub fn parse_keys(digits: &str) -> Result<[bool; 16], String> {
    let mut keys = [false; 16];
    for c in digits.chars() {
        let key = c
            .to_digit(16)
            .ok_or_else(|| format!("'{}' is not a key; keys are hex digits 0-F", c))?;
        keys[key as usize] = true;
    }
    Ok(keys)
}

pub fn run(rom: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut chip8 = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };
    chip8.link_audio(Box::new(LogBeep { beeps: 0 }));

    let program = fs::read(rom)?;
    chip8.load(&program)?;
    info!("loaded {} ({} bytes)", rom.display(), program.len());

    let cycle_time = Duration::from_nanos(config.clock_speed);
    let mut last_cycle = Instant::now();
    let mut cycles: u64 = 0;
    let mut frames: u64 = 0;

    while config.cycles.map_or(true, |limit| cycles < limit) {
        chip8.set_keys(config.keys);

        if let Err(e) = chip8.step() {
            error!(
                "halted after {} cycles at {:#05X}: {}",
                cycles,
                chip8.program_counter(),
                e
            );
            summarize(&chip8, cycles, frames);
            return Err(e.into());
        }
        cycles += 1;

        // No display is attached; consuming the flag stands in for a render
        if chip8.take_redraw_flag() {
            frames += 1;
        }

        // Handle timing
        let elapsed_cycle_time = last_cycle.elapsed();
        if !config.fast && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    summarize(&chip8, cycles, frames);
    Ok(())
}

fn summarize(chip8: &Chip8, cycles: u64, frames: u64) {
    info!("{} cycles, {} frames", cycles, frames);
    println!(
        "pc {:04X} i {:04X} v {:02X?}",
        chip8.program_counter(),
        chip8.index_register(),
        chip8.registers()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_held_keys() {
        let keys = parse_keys("5aF").unwrap();
        let held: Vec<usize> = (0..16).filter(|&k| keys[k]).collect();
        assert_eq!(held, vec![0x5, 0xA, 0xF]);
    }

    #[test]
    fn test_parses_no_keys() {
        assert_eq!(parse_keys("").unwrap(), [false; 16]);
    }

    #[test]
    fn test_rejects_non_hex_keys() {
        assert!(parse_keys("g").is_err());
    }

    #[test]
    fn test_runs_cycle_budget() {
        let rom = std::env::temp_dir().join("emu8-run-budget.ch8");
        // 0x200: JP 0x200
        fs::write(&rom, [0x12u8, 0x00]).unwrap();
        let config = Config {
            cycles: Some(10),
            clock_speed: 0,
            fast: true,
            seed: Some(1),
            keys: [false; 16],
        };
        assert!(run(&rom, &config).is_ok());
        fs::remove_file(&rom).unwrap();
    }

    #[test]
    fn test_reports_engine_errors() {
        let rom = std::env::temp_dir().join("emu8-run-error.ch8");
        fs::write(&rom, [0x00u8, 0xEE]).unwrap();
        let config = Config {
            cycles: None,
            clock_speed: 0,
            fast: true,
            seed: None,
            keys: [false; 16],
        };
        let err = run(&rom, &config).unwrap_err();
        assert!(err.to_string().contains("stack underflow"));
        fs::remove_file(&rom).unwrap();
    }
}
