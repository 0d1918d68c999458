use anyhow::{Context, Result};
use log::LevelFilter;
use std::{env, path::PathBuf};

use mdlive::headless::{
    HeadlessClipboard, HeadlessControls, HeadlessEditor, HeadlessExportDialog, HeadlessExporter,
    HeadlessPane, HeadlessSplit,
};
use mdlive::layout::ContainerGeometry;
use mdlive::surface::EditorWidget;
use mdlive::{Config, FileBackend, Session, SessionEvent, SessionStore, SplitLayout, Surfaces};

const USAGE: &str = "usage: mdlive [--dark] [FILE]";

struct Args {
    dark: bool,
    file: Option<PathBuf>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = Args {
        dark: false,
        file: None,
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--dark" => args.dark = true,
            flag if flag.starts_with('-') => anyhow::bail!("unknown option {}\n{}", flag, USAGE),
            path => {
                if args.file.is_some() {
                    anyhow::bail!("only one file can be previewed\n{}", USAGE);
                }
                args.file = Some(PathBuf::from(path));
            }
        }
    }
    Ok(Some(args))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("mdlive", LevelFilter::Debug);
    }
    logger.init();

    let args = match parse_args()? {
        Some(args) => args,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    };

    let store = match FileBackend::new() {
        Ok(backend) => SessionStore::new(Box::new(backend)),
        Err(e) => {
            log::warn!("Persistent storage unavailable, this session will not be saved: {}", e);
            SessionStore::in_memory()
        }
    };

    let mut editor = HeadlessEditor::new();
    let preview = HeadlessPane::new(800.0);
    let split = HeadlessSplit::new(ContainerGeometry {
        left: 0.0,
        width: 1280.0,
        divider_width: 8.0,
    });
    let layout = SplitLayout::new(
        Box::new(split),
        config.layout.min_pane_width,
        config.layout.initial_ratio,
    );
    let surfaces = Surfaces {
        editor: Box::new(editor.clone()),
        preview: Box::new(preview.clone()),
        controls: Box::new(HeadlessControls::new(true)),
        clipboard: Box::new(HeadlessClipboard::new()),
        export_dialog: Box::new(HeadlessExportDialog::new()),
        exporter: Box::new(HeadlessExporter::new()),
    };

    let mut session = Session::boot(config, store, surfaces, layout, args.dark).await?;
    log::info!("Session ready");

    if let Some(path) = args.file {
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        editor.set_value(&content);
        session.handle(SessionEvent::ContentChanged).await?;
        log::info!("Previewing {}", path.display());
    }

    print!("{}", preview.html());
    Ok(())
}
