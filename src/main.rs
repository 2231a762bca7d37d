#![allow(non_snake_case)]

mod app;
mod components;
mod confirm;
mod context;
mod theme;

use std::path::PathBuf;

use clap::Parser;
use dioxus::desktop::{Config, WindowBuilder};
use notedesk_core::logging::{LoggingBuilder, SessionInfo};
use notedesk_core::SessionConfig;

use crate::context::Session;

/// NoteDesk - notes and contacts
#[derive(Parser, Debug)]
#[command(name = "notedesk-desktop")]
#[command(about = "NoteDesk - notes, folders and contacts with an AI-assisted editor")]
struct Args {
    /// Data directory (use different dirs for multiple instances)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Instance name (creates data dir: notedesk-<name>)
    #[arg(short, long)]
    name: Option<String>,

    /// JSON file with the starting profile, notes and folders
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Show the AI controls from the start
    #[arg(long)]
    ai: bool,

    /// Log to the console only
    #[arg(long)]
    no_log_file: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = SessionConfig::resolve(args.data_dir, args.name).with_ai(args.ai);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.no_log_file {
        config = config.without_log_file();
    }

    let mut info = SessionInfo::start(&config.instance);
    info.data_dir = Some(config.data_dir.display().to_string());
    info.seed = config.seed_path.as_ref().map(|p| p.display().to_string());
    info.ai_enabled = config.ai_enabled;

    let mut logging = LoggingBuilder::new(config.logs_dir(), &config.instance).with_session(info);
    if !config.log_to_file {
        logging = logging.no_file();
    }
    let handle = logging.init()?;

    tracing::info!(
        instance = %config.instance,
        data_dir = ?config.data_dir,
        log = ?handle.log_path(),
        "Starting NoteDesk"
    );

    let title = config.window_title();
    let session = Session::open(config)?;

    let window = WindowBuilder::new()
        .with_title(&title)
        .with_inner_size(dioxus::desktop::LogicalSize::new(1100.0, 760.0))
        .with_resizable(true);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(Config::new().with_window(window))
        .with_context(session)
        .launch(app::App);
    Ok(())
}
