mod audio;
mod input;
mod record;
mod tui;

use checkitout_core::{Filer, FixedSandbox, OsSandbox, Sandbox, Session, Settings, StoreDirectory};
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::{path::PathBuf, sync::Arc};

const APP_NAME: &str = "checkitout";
const LOG_FILE: &str = "checkitout.log";

/// sixteen pad sampler over a sandboxed sample store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// sandbox home; defaults to the per-user data directory
    #[arg(long)]
    home: Option<PathBuf>,
    /// directory holding the bundled samples
    #[arg(long)]
    bundle: Option<PathBuf>,
    /// skip connecting to midi inputs
    #[arg(long)]
    no_midi: bool,
}

/// log to a file in the cache root, the terminal belongs to the tui
fn init_logger(filer: &Filer<Arc<dyn Sandbox + Send + Sync>>) -> Result<()> {
    let path = filer.root(StoreDirectory::Cache)?.join(LOG_FILE);
    let file = std::fs::File::create(&path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    log::info!("logging to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let sandbox: Arc<dyn Sandbox + Send + Sync> = match args.home {
        Some(home) => Arc::new(FixedSandbox::new(home)),
        None => Arc::new(OsSandbox::new(APP_NAME)),
    };
    let filer = Filer::new(sandbox.clone());
    filer.ensure_roots()?;
    init_logger(&filer)?;

    let mut settings = Settings::load(&sandbox)?;
    if let Some(bundle) = args.bundle {
        settings.bundle = bundle;
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no output device"))?;
    let config = device.default_output_config()?;
    let out_rate = config.sample_rate().0;
    log::info!(
        "output on {} @ {out_rate} Hz",
        device.name().unwrap_or_else(|_| "unknown device".to_string())
    );

    let (audio_tx, audio_rx) = std::sync::mpsc::channel();
    let (tui_tx, tui_rx) = std::sync::mpsc::channel();
    let (spent_tx, spent_rx) = std::sync::mpsc::channel();

    let handler = audio::SystemHandler::new(audio_rx, spent_tx);
    let stream = audio::build_output(&device, config, handler)?;
    stream.play()?;

    // held for the lifetime of the tui
    let _midi = if args.no_midi {
        Vec::new()
    } else {
        input::connect(settings.midi_base_note, tui_tx.clone()).unwrap_or_else(|e| {
            log::warn!("midi: {e}");
            Vec::new()
        })
    };

    let session = Session::new(filer, settings);
    let mut tui = tui::TuiHandler::new(session, audio_tx, tui_tx, spent_rx, out_rate);
    let mut terminal = ratatui::init();
    let result = tui.run(&mut terminal, tui_rx);
    ratatui::restore();
    result
}
