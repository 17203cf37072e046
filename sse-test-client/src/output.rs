use colored::*;
use serde_json::Value;
use sse_client::ClientEvent;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// One delivery received on a channel.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub channel: String,
    pub data: Value,
    pub received_at: Instant,
}

pub fn print_delivery(delivery: &Delivery, since: Instant) {
    println!(
        "\n[{}] event received (+{:?})",
        delivery.channel.bright_blue().bold(),
        delivery.received_at.saturating_duration_since(since)
    );

    if let Ok(pretty) = serde_json::to_string_pretty(&delivery.data) {
        for line in pretty.lines() {
            println!("   {}", line.dimmed());
        }
    }
}

pub fn print_lifecycle(event: ClientEvent) {
    let label = match event {
        ClientEvent::Connect => "connected".green(),
        ClientEvent::ConnectionError => "connection error".red(),
        ClientEvent::ConnectionLost => "connection lost".yellow(),
    };
    println!("{} {}", "●".bold(), label.bold());
}

/// Per-channel delivery counts for the final report.
#[derive(Debug, Default)]
pub struct Tally {
    counts: BTreeMap<String, usize>,
}

impl Tally {
    pub fn expect_channel(&mut self, channel: &str) {
        self.counts.entry(channel.to_string()).or_insert(0);
    }

    pub fn record(&mut self, delivery: &Delivery) {
        *self.counts.entry(delivery.channel.clone()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, channel: &str) -> usize {
        self.counts.get(channel).copied().unwrap_or(0)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&String, &usize)> {
        self.counts.iter()
    }
}

pub fn print_summary(tally: &Tally, elapsed: Duration) {
    println!("\n{}", "=== SUMMARY ===".bright_white().bold());

    for (channel, count) in tally.channels() {
        let count = if *count == 0 {
            count.to_string().red()
        } else {
            count.to_string().green()
        };
        println!("[{}] {} event(s)", channel.bold(), count);
    }

    println!(
        "\n{}: {} event(s) in {:?}",
        "Total".bold(),
        tally.total(),
        elapsed
    );
}
