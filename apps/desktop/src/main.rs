use anyhow::Result;
use clap::Parser;
use client_core::{mount, GreetingView, HttpGreetingApi};

/// Headless frontend: mounts the greeting view once and prints it.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let api = HttpGreetingApi::new(&args.server_url)?;
    let mut view = GreetingView::new();
    mount(&api, &mut view).await;

    println!("{}", view.title());
    println!("{}", view.display());
    Ok(())
}
