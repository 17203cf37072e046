use anyhow::Result;
use clap::Parser;
use colored::*;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

mod output;

use output::{print_delivery, print_lifecycle, print_summary, Delivery, Tally};
use sse_client::{ClientEvent, SseClient};

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Subscribe to SSE channels and print what arrives")]
struct Cli {
    /// Base URL of the channel server (e.g., localhost:4000 or http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Channel to subscribe to (repeat for several channels)
    #[arg(long = "channel", short, required = true)]
    channels: Vec<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Leave every channel before exiting
    #[arg(long)]
    unsubscribe_on_exit: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

enum Update {
    Delivery(Delivery),
    Lifecycle(ClientEvent),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut client = SseClient::new(cli.base_url.clone())?;
    println!("{} Client id: {}", "→".blue(), client.client_id());

    for event in [
        ClientEvent::Connect,
        ClientEvent::ConnectionError,
        ClientEvent::ConnectionLost,
    ] {
        let tx = tx.clone();
        client.add_event_listener(event, move |event| {
            let _ = tx.send(Update::Lifecycle(event));
        });
    }

    println!("{} Connecting to {}...", "→".blue(), cli.base_url);
    client.connect().await?;

    let mut tally = Tally::default();
    for channel in &cli.channels {
        tally.expect_channel(channel);

        let tx = tx.clone();
        let name = channel.clone();
        let subscribed = client
            .subscribe(channel, move |data| {
                let _ = tx.send(Update::Delivery(Delivery {
                    channel: name.clone(),
                    data,
                    received_at: Instant::now(),
                }));
            })
            .await;

        if subscribed {
            println!("{} Subscribed to '{}'", "✓".green(), channel);
        } else {
            println!("{} Unable to subscribe to '{}'", "✗".red(), channel);
        }
    }
    drop(tx);

    println!("\n{}", "=== LISTENING ===".bright_white().bold());

    let start = Instant::now();
    let deadline = cli.duration_secs.map(Duration::from_secs);
    let stop = async {
        match deadline {
            Some(duration) => tokio::time::sleep(duration).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            update = rx.recv() => match update {
                Some(Update::Delivery(delivery)) => {
                    print_delivery(&delivery, start);
                    tally.record(&delivery);
                }
                Some(Update::Lifecycle(event)) => {
                    print_lifecycle(event);
                    if event == ClientEvent::ConnectionLost {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    if cli.unsubscribe_on_exit {
        for channel in client.channels() {
            if let Err(e) = client.unsubscribe(&channel).await {
                println!("{} {}", "✗".red(), e);
            }
        }
    }
    client.disconnect();

    print_summary(&tally, start.elapsed());

    Ok(())
}
