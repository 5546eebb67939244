//! Headless ZX80/ZX81 runner.
//!
//! Runs a number of frames, optionally loading a program through the LOAD
//! fast path, and can save the last frame as a PNG screenshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use emu_zx81::capture::save_screenshot;
use emu_zx81::{MachineConfig, Model, TapeDeck, Zx81};
use log::info;
use sinclair_zx81_ula::BorderSize;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Zx80,
    Zx81,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BorderArg {
    None,
    Small,
    Normal,
    Large,
    Full,
}

impl From<BorderArg> for BorderSize {
    fn from(arg: BorderArg) -> Self {
        match arg {
            BorderArg::None => Self::None,
            BorderArg::Small => Self::Small,
            BorderArg::Normal => Self::Normal,
            BorderArg::Large => Self::Large,
            BorderArg::Full => Self::Full,
        }
    }
}

#[derive(Parser)]
#[command(name = "emu-zx81", about = "ZX80/ZX81 emulator")]
struct Args {
    /// Machine model (ignored when --config is given)
    #[arg(long, value_enum, default_value = "zx81")]
    model: ModelArg,

    /// ROM image to load at address 0
    #[arg(long)]
    rom: PathBuf,

    /// JSON machine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Program to put on the tape (.p for ZX81, .o for ZX80)
    #[arg(long)]
    tape: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 200)]
    frames: u64,

    /// Type the LOAD command at this frame
    #[arg(long)]
    autoload: Option<u64>,

    /// 60 Hz timing
    #[arg(long, default_value_t = false)]
    ntsc: bool,

    /// Border kept around the picture in the screenshot
    #[arg(long, value_enum)]
    border: Option<BorderArg>,

    /// Return from the scanline loop after every instruction
    #[arg(long, default_value_t = false)]
    single_step: bool,

    /// Save the last frame to this file as PNG
    #[arg(long)]
    dump_screen: Option<PathBuf>,

    /// Pace emulation to the machine's clock
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MachineConfig::from_json(&text)?
        }
        None => MachineConfig::for_model(match args.model {
            ModelArg::Zx80 => Model::Zx80,
            ModelArg::Zx81 => Model::Zx81,
        }),
    };
    if args.ntsc {
        config = config.with_ntsc();
    }
    if let Some(border) = args.border {
        config.border = border.into();
    }
    config.single_step |= args.single_step;
    let model = config.model;

    let mut zx81 = Zx81::new(config)?;
    let rom = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom.display()))?;
    if let Err(err) = zx81.load_rom(&rom) {
        // A short ROM still runs; whatever was read is in place.
        eprintln!("{err}");
    }

    if let Some(path) = &args.tape {
        zx81.insert_tape(Box::new(load_tape(path)?));
    }
    if let Some(frame) = args.autoload {
        zx81.input_queue().enqueue_autoload(model, frame);
    }

    let started = Instant::now();
    let mut tstates = 0;
    while zx81.frame_count() < args.frames && !zx81.is_stopped() {
        tstates += zx81.run_frame();
        if args.realtime {
            let due = zx81.duration_of(tstates);
            if let Some(ahead) = due.checked_sub(started.elapsed()) {
                std::thread::sleep(ahead);
            }
        }
    }
    info!(
        "{} frames, {} T-states in {:.2?}",
        zx81.frame_count(),
        tstates,
        started.elapsed()
    );

    if let Some(path) = &args.dump_screen {
        let frame = zx81.shared_frame().latest();
        save_screenshot(&frame, zx81.window(), path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Screen written to {}", path.display());
    }
    Ok(())
}

/// Put a program file on a fresh tape. `.o` files are ZX80 programs; any
/// other extension is taken as a ZX81 `.p` file named after its stem.
fn load_tape(path: &Path) -> Result<TapeDeck> {
    let image = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut deck = TapeDeck::new();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if extension.as_deref() == Some("o") {
        deck.push_zx80_program(&image);
    } else {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        deck.push_program(name, &image);
    }
    Ok(deck)
}
