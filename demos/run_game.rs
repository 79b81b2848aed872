// NES Emulator - Game Runner
//
// Loads a ROM given on the command line and drives it in a window, using
// the same console driver and presentation stack as the `nes-rs` binary.

use nes_rs::display::{run_emulator, WindowConfig};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <rom_path>", args[0]);
        std::process::exit(1);
    }

    let rom_path = PathBuf::from(&args[1]);
    let config = WindowConfig::new().with_scale(3).with_fps(60).with_vsync(true);

    run_emulator(config, rom_path)?;

    Ok(())
}
