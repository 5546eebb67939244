//! Top-level ZX80/ZX81 system.
//!
//! There is no video clock to tick: the CPU is the video generator. The
//! machine runs instructions until the ULA closes a scanline, turning each
//! instruction's T-states into pixel samples on the way.
//!
//! # Scanline loop
//!
//! Per instruction:
//!
//! 1. clear the ULA's port-event latch,
//! 2. run the LOAD fast path if the CPU is at a LOAD entry point,
//! 3. execute one instruction, then deliver any maskable interrupt (A6 is
//!    wired to INT, so it fires whenever R bit 6 is clear),
//! 4. emit two samples per T-state and apply the instruction's port event,
//! 5. count the T-states down against the line; when the line expires,
//!    fire the NMI if the NMI generator is on and close the line.
//!
//! A call ends when the line holds a sync, the sample buffer is full (one
//! instruction in single-step mode), or the stop flag is raised.
//!
//! # Frame loop
//!
//! `step_scanline()` hands each finished line to the raster;
//! `run_frame()` repeats it until the raster completes a frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use emu_core::{Cpu, MasterClock, Observable, Ticks, Value};
use log::{debug, info, warn};
use sinclair_zx81_ula::{MAX_SAMPLES, Raster, Scanline, SharedFrame, SyncKind, Window};
use zilog_z80::Z80;

use crate::bus::Zx81Bus;
use crate::config::{ConfigError, MachineConfig};
use crate::fast_load;
use crate::input::{InputQueue, Zx81Key};
use crate::keyboard::KeyboardMatrix;
use crate::memory::LoadError;
use crate::tape::{TapeDeck, TapeSource};

/// Scanlines `run_frame` will run without a frame completing before it
/// gives up (the program never produced a vertical sync).
const MAX_LINES_PER_FRAME: u32 = 4;

/// Outcome of one `step_scanline()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineReport {
    /// T-states executed.
    pub tstates: u32,
    /// What ended the line.
    pub sync: SyncKind,
    /// The line completed a frame.
    pub frame_complete: bool,
}

/// ZX80 or ZX81 system.
pub struct Zx81 {
    cpu: Z80,
    bus: Zx81Bus,
    config: MachineConfig,
    clock: MasterClock,
    line: Option<Scanline>,
    raster: Raster,
    window: Window,
    tape: Box<dyn TapeSource + Send>,
    input_queue: InputQueue,
    stop: Arc<AtomicBool>,
    /// T-state position within the frame, for the frame interrupt.
    frame_tstate: u32,
    /// Completed frame counter.
    frame_count: u64,
}

impl Zx81 {
    /// Build a machine. Memory starts zeroed; load a ROM before running.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let keyboard = Arc::new(KeyboardMatrix::new());
        let bus = Zx81Bus::new(&config, keyboard);
        let mut raster = Raster::new(
            config.tstates_per_line,
            config.lines_per_frame,
            SharedFrame::new(),
        );
        raster.set_interlaced(config.interlaced);
        let window = Window::new(config.border, config.ntsc, raster.width(), raster.height());

        info!(
            "{:?}: {} T-states x {} lines, RAM top {:#06X}",
            config.model, config.tstates_per_line, config.lines_per_frame, config.ram_top
        );

        Ok(Self {
            cpu: Z80::new(),
            bus,
            clock: MasterClock::new(config.clock_hz),
            config,
            line: Some(Scanline::new()),
            raster,
            window,
            tape: Box::new(TapeDeck::new()),
            input_queue: InputQueue::new(),
            stop: Arc::new(AtomicBool::new(false)),
            frame_tstate: 0,
            frame_count: 0,
        })
    }

    /// Load a ROM image at address 0.
    ///
    /// # Errors
    ///
    /// [`LoadError::Incomplete`] for a short image. The part that was read
    /// stays loaded and the machine can still run.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), LoadError> {
        let result = self.bus.memory.load_rom(image);
        match &result {
            Ok(()) => info!("ROM loaded ({} bytes)", image.len()),
            Err(err) => warn!("{err}"),
        }
        result
    }

    /// Store bytes straight into memory, ignoring ROM protection.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        self.bus.memory.load(address, bytes);
    }

    /// Replace the tape the LOAD fast path reads from.
    pub fn insert_tape(&mut self, tape: Box<dyn TapeSource + Send>) {
        info!("Tape inserted");
        self.tape = tape;
    }

    /// Reset the CPU and ULA. Memory is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.ula.reset();
        self.frame_tstate = 0;
        info!("Reset");
    }

    /// Run instructions until the ULA ends a scanline. Returns the T-states
    /// executed.
    ///
    /// `line` must be the buffer passed to the previous call: a sync pulse
    /// recorded there is cleared, and an unfinished one carries on.
    pub fn advance_scanline(&mut self, line: &mut Scanline) -> u32 {
        let limit = if self.config.single_step {
            1
        } else {
            MAX_SAMPLES
        };

        line.clear_samples();
        if line.has_sync() {
            line.reset_sync();
            self.bus.ula.carry_in(line);
        }

        let mut total = 0;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            self.bus.ula.clear_port_event();
            fast_load::try_fast_load(&mut self.cpu, &mut self.bus.memory, self.tape.as_mut());

            let mut tstates = self.cpu.step(&mut self.bus);
            tstates += self.deliver_interrupts(tstates);

            self.bus.ula.emit(line, tstates);
            self.bus.ula.apply_port_event(line);

            if self.bus.ula.count(line, tstates) {
                if self.bus.ula.nmi_generator() {
                    let halt_wait = self.bus.ula.halt_wait(line);
                    let nmi = self.cpu.nmi(&mut self.bus, halt_wait);
                    self.bus.ula.charge(nmi);
                    tstates += nmi;
                }
                self.bus.ula.end_line(line);
            }

            total += tstates;
            if line.len() >= limit || line.has_sync() {
                break;
            }
        }

        if line.sync_valid() == SyncKind::Vertical {
            self.bus.ula.restart_line();
        }
        total
    }

    /// Frame and A6 interrupts after an instruction of `tstates`. Returns
    /// the T-states spent accepting them.
    fn deliver_interrupts(&mut self, tstates: u32) -> u32 {
        let mut taken = 0;
        let frame_length = self.config.tstates_per_frame();

        if let Some(position) = self.config.interrupt_tstate {
            let before = self.frame_tstate;
            let after = before + tstates;
            let crossed = (before < position && after >= position)
                || (after >= frame_length && after - frame_length >= position);
            if crossed {
                taken += self.cpu.interrupt(&mut self.bus);
            }
        }

        if self.cpu.r() & 0x40 == 0 {
            taken += self.cpu.interrupt(&mut self.bus);
        }

        self.frame_tstate = (self.frame_tstate + tstates + taken) % frame_length;
        taken
    }

    /// Run one scanline and draw it.
    pub fn step_scanline(&mut self) -> ScanlineReport {
        let mut line = self.line.take().unwrap_or_default();
        let tstates = self.advance_scanline(&mut line);
        let frame_complete = self.raster.draw(&line);
        let sync = line.sync_valid();
        if frame_complete {
            self.frame_count += 1;
            self.input_queue
                .process(self.frame_count, self.bus.keyboard());
            debug!(
                "Frame {} complete, vsync {} T-states",
                self.frame_count,
                line.sync_len()
            );
        }
        self.line = Some(line);

        ScanlineReport {
            tstates,
            sync,
            frame_complete,
        }
    }

    /// Run scanlines until a frame completes or the machine is stopped.
    /// Returns the T-states executed.
    pub fn run_frame(&mut self) -> u64 {
        let start = self.cpu.total_ticks();
        let max_lines = self.config.lines_per_frame * MAX_LINES_PER_FRAME;
        for _ in 0..max_lines {
            if self.is_stopped() || self.step_scanline().frame_complete {
                break;
            }
        }
        (self.cpu.total_ticks() - start).get()
    }

    /// Wall-clock time `tstates` take on the real machine.
    #[must_use]
    pub fn duration_of(&self, tstates: u64) -> std::time::Duration {
        self.clock.duration_of(Ticks::new(tstates))
    }

    /// Flag checked between instructions; set it from any thread to make
    /// the scanline loop return.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Latest completed frame, shareable with a renderer thread.
    #[must_use]
    pub fn shared_frame(&self) -> SharedFrame {
        self.raster.shared().clone()
    }

    /// Visible part of the raster for the configured border.
    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// The last scanline produced by `step_scanline()`.
    #[must_use]
    pub fn scanline(&self) -> Option<&Scanline> {
        self.line.as_ref()
    }

    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &Zx81Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Zx81Bus {
        &mut self.bus
    }

    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Keyboard shared with input threads.
    #[must_use]
    pub fn keyboard(&self) -> Arc<KeyboardMatrix> {
        Arc::clone(self.bus.keyboard())
    }

    /// Mutable reference to the timed input queue.
    pub fn input_queue(&mut self) -> &mut InputQueue {
        &mut self.input_queue
    }

    /// Press a key immediately (stays pressed until released).
    pub fn press_key(&mut self, key: Zx81Key) {
        let (row, bit) = key.matrix();
        self.bus.keyboard().set_key(row, bit, true);
    }

    pub fn release_key(&mut self, key: Zx81Key) {
        let (row, bit) = key.matrix();
        self.bus.keyboard().set_key(row, bit, false);
    }
}

impl Observable for Zx81 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(register) = path.strip_prefix("cpu.") {
            return self.cpu.query(register);
        }
        if let Some(address) = path.strip_prefix("memory.") {
            let address = address.trim_start_matches("0x");
            return u16::from_str_radix(address, 16)
                .ok()
                .map(|address| self.bus.memory.read(address).into());
        }
        let (x, y) = self.raster.position();
        match path {
            "ula.row" => Some(self.bus.ula.rowcounter().into()),
            "ula.hsync" => Some(self.bus.ula.hsync_generator().into()),
            "ula.nmi" => Some(self.bus.ula.nmi_generator().into()),
            "ula.line_counter" => Some(self.bus.ula.hsync_counter().into()),
            "ula.qs" => Some(self.bus.qs_enabled().into()),
            "raster.x" => Some((x as u32).into()),
            "raster.y" => Some((y as u32).into()),
            "frames" => Some(self.frame_count.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<reg>",
            "memory.<addr>",
            "ula.row",
            "ula.hsync",
            "ula.nmi",
            "ula.line_counter",
            "ula.qs",
            "raster.x",
            "raster.y",
            "frames",
        ]
    }
}
