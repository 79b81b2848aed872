// NES Emulator - Main Entry Point
//
// Loads a cartridge named on the command line and drives it in a window.

use log::error;
use nes_rs::display::{run_emulator, WindowConfig};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let rom_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: nes-rs <rom.nes>");
            return ExitCode::FAILURE;
        }
    };

    if !rom_path.exists() {
        error!("cartridge file not found: {}", rom_path.display());
        return ExitCode::FAILURE;
    }

    let config = WindowConfig::new().with_scale(3).with_fps(60).with_vsync(true);

    if let Err(err) = run_emulator(config, rom_path) {
        error!("emulator exited with error: {}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
