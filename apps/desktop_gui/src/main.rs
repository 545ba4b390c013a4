use std::{thread, time::Duration};

use clap::Parser;
use client_core::{FetchOutcome, GreetingView, HttpGreetingApi};
use crossbeam_channel::{bounded, Receiver, Sender};
use eframe::egui;
use tracing::error;

#[derive(Parser, Debug)]
struct Args {
    /// Backend base URL the greeting is fetched from.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
}

enum BackendCommand {
    FetchGreeting { server_url: String },
}

enum UiEvent {
    GreetingSettled(FetchOutcome),
}

/// Worker thread owning the tokio runtime and the HTTP client; the paint
/// thread never blocks on the network.
fn spawn_backend_thread(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::GreetingSettled(FetchOutcome::Failed));
                return;
            }
        };

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::FetchGreeting { server_url } => {
                        let outcome = match HttpGreetingApi::new(&server_url) {
                            Ok(api) => FetchOutcome::settle(&api).await,
                            Err(err) => {
                                error!("invalid server url '{server_url}': {err}");
                                FetchOutcome::Failed
                            }
                        };
                        let _ = ui_tx.send(UiEvent::GreetingSettled(outcome));
                    }
                }
            }
        });
    });
}

struct GreetingApp {
    ui_rx: Receiver<UiEvent>,
    view: GreetingView,
}

impl GreetingApp {
    fn new(cmd_tx: &Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, server_url: String) -> Self {
        // The one fetch this view ever issues.
        let _ = cmd_tx.send(BackendCommand::FetchGreeting { server_url });
        Self {
            ui_rx,
            view: GreetingView::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::GreetingSettled(outcome) => {
                    self.view.apply(outcome);
                }
            }
        }
    }
}

impl eframe::App for GreetingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.view.title());
            ui.label(self.view.display());
        });

        if !self.view.is_settled() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(16);
    spawn_backend_thread(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PayLens")
            .with_inner_size([480.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        "PayLens",
        options,
        Box::new(move |_cc| Ok(Box::new(GreetingApp::new(&cmd_tx, ui_rx, args.server_url)))),
    )
}
