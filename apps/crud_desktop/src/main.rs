use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime::BackendClients};
use config::{LaunchOverrides, TimestampZone};
use controller::events::UiEvent;
use ui::CrudDesktopApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop client for the resource and student CRUD backends")]
struct Args {
    /// Settings file; defaults to the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    resource_api: Option<String>,
    #[arg(long)]
    student_api: Option<String>,
    /// How long error toasts stay on screen.
    #[arg(long)]
    notification_ms: Option<u64>,
    #[arg(long, value_enum)]
    timestamp_zone: Option<TimestampZone>,
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn overrides(&self) -> LaunchOverrides {
        LaunchOverrides {
            resource_api_url: self.resource_api.clone(),
            student_api_url: self.student_api.clone(),
            notification_ms: self.notification_ms,
            timestamp_zone: self.timestamp_zone,
            log_filter: self.log_filter.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = config::apply_overrides(
        config::load_settings(args.config.as_deref())?,
        args.overrides(),
    );

    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    settings.validate()?;
    tracing::info!(
        resource_api = %settings.resource_api_url,
        student_api = %settings.student_api_url,
        "starting crud desktop"
    );

    let clients = BackendClients::from_settings(&settings)?;
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let worker = backend_bridge::runtime::launch(cmd_rx, ui_tx, clients);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CRUD Desktop")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "CRUD Desktop",
        options,
        Box::new(move |_cc| Ok(Box::new(CrudDesktopApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow::anyhow!("window event loop failed: {err}"))?;

    if worker.join().is_err() {
        tracing::warn!("backend worker panicked during shutdown");
    }
    Ok(())
}
