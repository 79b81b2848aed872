// Emulator module - Main emulator coordinator
//
// This module provides the console driver: it wires together the CPU, Bus
// (which itself owns the PPU, APU, controller ports, and cartridge mapper),
// and runs the fetch/execute/render loop one frame at a time.

mod config;

pub use config::{EmulatorConfig, SpeedMode};

use crate::bus::Bus;
use crate::cartridge::{Cartridge, INesError};
use crate::cpu::Cpu;
use log::info;
use std::path::{Path, PathBuf};

/// CPU cycles per PPU cycle (the PPU runs at 3x the CPU's clock).
const PPU_CYCLES_PER_CPU_CYCLE: u32 = 3;

/// Errors that can occur loading a cartridge into the emulator.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be parsed as a valid iNES image.
    Cartridge(INesError),
    /// The cartridge's mapper ID isn't one of the two this crate implements.
    Mapper(crate::cartridge::mappers::MapperError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Cartridge(e) => write!(f, "{}", e),
            LoadError::Mapper(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<INesError> for LoadError {
    fn from(e: INesError) -> Self {
        LoadError::Cartridge(e)
    }
}

impl From<crate::cartridge::mappers::MapperError> for LoadError {
    fn from(e: crate::cartridge::mappers::MapperError) -> Self {
        LoadError::Mapper(e)
    }
}

/// Console driver: coordinates the CPU and Bus to run a loaded cartridge.
///
/// Owns no cartridge data directly; once `load` installs one, the bus's
/// mapper is the single source of truth for PRG/CHR banking.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: EmulatorConfig,
    rom_path: Option<PathBuf>,
    paused: bool,
    speed_mode: SpeedMode,
}

impl Emulator {
    /// Create a new emulator instance with no cartridge loaded.
    pub fn new() -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            config: EmulatorConfig::load_or_default(),
            rom_path: None,
            paused: false,
            speed_mode: SpeedMode::Normal,
        }
    }

    /// Load an iNES ROM file, build its mapper, wire it into the bus and
    /// PPU, and reset the console.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.bus.load_cartridge(cartridge)?;
        self.rom_path = Some(path.to_path_buf());
        info!("loaded cartridge: {}", path.display());
        self.reset();
        Ok(())
    }

    /// Load an iNES image already read into memory. Useful for tests and for
    /// callers that fetch ROM bytes from somewhere other than the filesystem.
    pub fn load_bytes(&mut self, data: &[u8]) -> Result<(), LoadError> {
        let cartridge = Cartridge::from_ines_bytes(data)?;
        self.bus.load_cartridge(cartridge)?;
        self.rom_path = None;
        self.reset();
        Ok(())
    }

    /// Reset the console: CPU (loads PC from the RESET vector), PPU, APU,
    /// and controller I/O. Equivalent to pressing the console's reset button.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.paused = false;
    }

    /// Run the emulator for exactly one CPU instruction (or one cycle of a
    /// pending stall/interrupt), keeping the PPU, APU, and mapper in lockstep.
    ///
    /// Returns `true` if this step completed a frame.
    pub fn step(&mut self) -> bool {
        let cpu_cycles = self.cpu.step(&mut self.bus) as u32;

        if let Some(stall) = self.bus.drain_oam_dma(self.cpu.cycles) {
            self.cpu.add_stall(stall);
        }

        let mut frame_complete = false;
        for _ in 0..(cpu_cycles * PPU_CYCLES_PER_CPU_CYCLE) {
            if self.bus.ppu.step() {
                frame_complete = true;
            }
            self.bus.tick_mapper();
        }

        for _ in 0..cpu_cycles {
            self.bus.apu.clock();
        }

        if self.bus.ppu.nmi_pending() {
            self.bus.ppu.clear_nmi();
            self.cpu.request_nmi();
        }

        frame_complete
    }

    /// Run the console until a full frame has been rendered. Does nothing if
    /// the emulator is paused.
    pub fn step_frame(&mut self) {
        if self.paused {
            return;
        }
        loop {
            if self.step() {
                break;
            }
        }
    }

    /// The most recently rendered frame as RGBA8 bytes (256x240x4).
    pub fn framebuffer_rgba(&self, output: &mut [u8]) {
        assert_eq!(
            output.len(),
            crate::display::SCREEN_WIDTH * crate::display::SCREEN_HEIGHT * 4,
            "output buffer must hold exactly one RGBA frame"
        );
        for (i, &palette_index) in self.bus.ppu.frame().iter().enumerate() {
            let rgba = crate::display::palette_to_rgba(palette_index);
            let offset = i * 4;
            output[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    /// Raw palette-index frame buffer (256x240 bytes, values 0-63).
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu.frame()
    }

    /// Update a controller's buttons from a bitmask (bit 0 = A ... bit 7 = Right).
    /// `port` 0 is controller 1, any other value is controller 2.
    pub fn set_buttons(&mut self, port: u8, mask: u8) {
        self.bus.controllers.set_buttons(port, mask);
    }

    /// Set speed mode (normal, fast forward, slow motion).
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    /// Get current speed mode.
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Pause the emulator; `step_frame` becomes a no-op until `resume`.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the emulator after a `pause`.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Check if the emulator is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get reference to CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get mutable reference to CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Get reference to Bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Get mutable reference to Bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Get reference to configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Get mutable reference to configuration.
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// Get the currently loaded ROM path, if loaded from a file.
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    /// Whether a cartridge is currently loaded.
    pub fn has_cartridge(&self) -> bool {
        self.bus.has_cartridge()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
