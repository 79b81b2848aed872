// Window module - Manages display window and rendering
//
// This module provides window creation, scaling, and frame rendering
// using the winit and pixels crates.

use super::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::emulator::Emulator;
use crate::input::keyboard::{KeyboardHandler, Player};
use crate::input::Controller;
use gilrs::{Button as GamepadButton, Gilrs};
use pixels::{Pixels, SurfaceTexture};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Window configuration
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Scale factor (1x, 2x, 3x, 4x, etc.)
    pub scale: u32,
    /// Target frame rate in Hz (typically 60 for NTSC NES)
    pub target_fps: u32,
    /// Whether to enable VSync
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a new window configuration with default values
    ///
    /// Default: 3x scale, 60 FPS, VSync enabled
    pub fn new() -> Self {
        Self {
            scale: 3,
            target_fps: 60,
            vsync: true,
        }
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.clamp(1, 8); // Clamp between 1x and 8x
        self
    }

    /// Set the target frame rate
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Set VSync enabled or disabled
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Get the window width in pixels
    pub fn window_width(&self) -> u32 {
        SCREEN_WIDTH as u32 * self.scale
    }

    /// Get the window height in pixels
    pub fn window_height(&self) -> u32 {
        SCREEN_HEIGHT as u32 * self.scale
    }

    /// Get the frame duration for the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps as u64)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine a controller's button states into the bitmask `Emulator::set_buttons`
/// expects (bit 0 = A ... bit 7 = Right).
fn controller_to_mask(controller: &Controller) -> u8 {
    (controller.button_a as u8)
        | (controller.button_b as u8) << 1
        | (controller.select as u8) << 2
        | (controller.start as u8) << 3
        | (controller.up as u8) << 4
        | (controller.down as u8) << 5
        | (controller.left as u8) << 6
        | (controller.right as u8) << 7
}

/// OR together the bitmask produced by a gamepad's currently held buttons,
/// using the same bit layout as `controller_to_mask`.
fn gamepad_mask(gamepad: &gilrs::Gamepad) -> u8 {
    let mut mask = 0u8;
    if gamepad.is_pressed(GamepadButton::South) {
        mask |= 0x01; // A
    }
    if gamepad.is_pressed(GamepadButton::East) {
        mask |= 0x02; // B
    }
    if gamepad.is_pressed(GamepadButton::Select) {
        mask |= 0x04;
    }
    if gamepad.is_pressed(GamepadButton::Start) {
        mask |= 0x08;
    }
    if gamepad.is_pressed(GamepadButton::DPadUp) {
        mask |= 0x10;
    }
    if gamepad.is_pressed(GamepadButton::DPadDown) {
        mask |= 0x20;
    }
    if gamepad.is_pressed(GamepadButton::DPadLeft) {
        mask |= 0x40;
    }
    if gamepad.is_pressed(GamepadButton::DPadRight) {
        mask |= 0x80;
    }
    mask
}

/// Window that drives a live `Emulator` instead of a static frame buffer.
///
/// Combines keyboard input (via `KeyboardHandler`) and gamepad input (via
/// `gilrs`) for both controller ports, steps the emulator one frame per
/// redraw, and blits its framebuffer straight into the `pixels` surface.
pub struct EmulatorDisplayWindow {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    config: WindowConfig,
    emulator: Emulator,
    last_frame_time: Instant,
    keyboard_handler: KeyboardHandler,
    gilrs: Option<Gilrs>,
}

impl EmulatorDisplayWindow {
    /// Load `rom_path` into a fresh emulator and build a window ready to run it.
    pub fn new(
        config: WindowConfig,
        rom_path: PathBuf,
    ) -> Result<Self, crate::emulator::LoadError> {
        let mut emulator = Emulator::new();
        emulator.load(&rom_path)?;

        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(err) => {
                eprintln!("gamepad support unavailable: {}", err);
                None
            }
        };

        Ok(Self {
            window: None,
            pixels: None,
            config,
            emulator,
            last_frame_time: Instant::now(),
            keyboard_handler: KeyboardHandler::new(),
            gilrs,
        })
    }

    /// Get a reference to the running emulator.
    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    /// Get a mutable reference to the running emulator.
    pub fn emulator_mut(&mut self) -> &mut Emulator {
        &mut self.emulator
    }

    /// Drain gamepad events and push the combined keyboard+gamepad state for
    /// both ports into the emulator's controller I/O.
    fn update_controllers(&mut self) {
        let mut mask1 = controller_to_mask(&self.keyboard_handler.get_controller_state(Player::One));
        let mut mask2 = controller_to_mask(&self.keyboard_handler.get_controller_state(Player::Two));

        if let Some(gilrs) = &mut self.gilrs {
            while gilrs.next_event().is_some() {}
            let mut gamepads = gilrs.gamepads();
            if let Some((_, pad)) = gamepads.next() {
                mask1 |= gamepad_mask(&pad);
            }
            if let Some((_, pad)) = gamepads.next() {
                mask2 |= gamepad_mask(&pad);
            }
        }

        self.emulator.set_buttons(0, mask1);
        self.emulator.set_buttons(1, mask2);
    }

    fn render(&mut self) -> Result<(), pixels::Error> {
        if let Some(pixels) = &mut self.pixels {
            self.emulator.framebuffer_rgba(pixels.frame_mut());
            pixels.render()?;
        }
        Ok(())
    }

    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        if elapsed >= self.config.frame_duration() {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }
}

impl ApplicationHandler for EmulatorDisplayWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("NES Emulator")
            .with_inner_size(LogicalSize::new(
                self.config.window_width(),
                self.config.window_height(),
            ))
            .with_resizable(false);

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");
        let window = Arc::new(window);
        let window_size = window.inner_size();

        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        let pixels = Pixels::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, surface_texture)
            .expect("Failed to create pixel buffer");

        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => self.keyboard_handler.handle_key_press(physical_key),
                ElementState::Released => self.keyboard_handler.handle_key_release(physical_key),
            },
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    self.update_controllers();
                    self.emulator.step_frame();
                    if let Err(err) = self.render() {
                        eprintln!("Render error: {}", err);
                        event_loop.exit();
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create and run a window that loads `rom_path` and drives a live emulator.
pub fn run_emulator(
    config: WindowConfig,
    rom_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    if config.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    let mut display = EmulatorDisplayWindow::new(config, rom_path)?;
    event_loop.run_app(&mut display)?;

    Ok(())
}
