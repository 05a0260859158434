//! Dynamic Pricing smoke test
//!
//! Exercises a running `dynamic-pricing` service over HTTP: quote a room, raise the hotel's
//! occupancy, quote again and check that the price went up.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pricing-smoke-test")]
#[command(about = "Smoke test a running Dynamic Pricing service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Base URL of the service
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    #[arg(long, default_value = "123")]
    hotel_id: String,

    #[arg(long, default_value = "deluxe")]
    room_type: String,

    #[arg(long, default_value = "loyal")]
    user_segment: String,

    /// Check-in date (YYYY-MM-DD); defaults to three days from today
    #[arg(long)]
    check_in: Option<String>,

    /// Occupancy reported before the first quote
    #[arg(long, default_value_t = 0.50)]
    baseline_occupancy: f64,

    /// Occupancy reported before the second quote
    #[arg(long, default_value_t = 0.90)]
    high_occupancy: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummary {
    base_price: f64,
    final_price: f64,
    demand_index: f64,
    #[serde(default)]
    applied_rules: Vec<RuleSummary>,
    #[serde(default)]
    audit_trail: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RuleSummary {
    name: String,
}

impl QuoteSummary {
    fn rule_names(&self) -> Vec<&str> {
        self.applied_rules.iter().map(|r| r.name.as_str()).collect()
    }
}

struct SmokeClient {
    client: Client,
    base_url: String,
}

impl SmokeClient {
    fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to reach /health")?;
        if !response.status().is_success() {
            bail!("Health check failed with status: {}", response.status());
        }
        Ok(())
    }

    async fn set_occupancy(&self, hotel_id: &str, value: f64) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/feeds/occupancy", self.base_url))
            .query(&[("hotelId", hotel_id.to_string()), ("value", value.to_string())])
            .send()
            .await
            .context("Failed to post occupancy")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Occupancy feed failed with status {}: {}", status, body);
        }
        info!("Set occupancy for hotel {} to {:.2}", hotel_id, value);
        Ok(())
    }

    async fn quote(&self, cli: &Cli, check_in: &str) -> Result<QuoteSummary> {
        let response = self
            .client
            .get(format!("{}/price", self.base_url))
            .query(&[
                ("hotelId", cli.hotel_id.as_str()),
                ("roomType", cli.room_type.as_str()),
                ("checkIn", check_in),
                ("userSegment", cli.user_segment.as_str()),
            ])
            .send()
            .await
            .context("Failed to request a quote")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Quote failed with status {}: {}", status, body);
        }
        response.json().await.context("Failed to parse quote JSON")
    }
}

fn report(label: &str, quote: &QuoteSummary) {
    info!(
        "{}: base {:.2}, final {:.2}, demand {:.3}, rules {:?}",
        label,
        quote.base_price,
        quote.final_price,
        quote.demand_index,
        quote.rule_names()
    );
    for line in &quote.audit_trail {
        info!("  {}", line);
    }
}

fn check_increase(before: &QuoteSummary, after: &QuoteSummary) -> Result<()> {
    if after.final_price > before.final_price {
        Ok(())
    } else {
        bail!(
            "Price did not increase with occupancy: {:.2} -> {:.2}",
            before.final_price,
            after.final_price
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let check_in = cli
        .check_in
        .clone()
        .unwrap_or_else(|| (Utc::now().date_naive() + Duration::days(3)).to_string());

    let client = SmokeClient::new(&cli.base_url)?;
    client.health().await?;
    info!("Service at {} is up", cli.base_url);

    client.set_occupancy(&cli.hotel_id, cli.baseline_occupancy).await?;
    let before = client.quote(&cli, &check_in).await?;
    report("Baseline quote", &before);

    client.set_occupancy(&cli.hotel_id, cli.high_occupancy).await?;
    let after = client.quote(&cli, &check_in).await?;
    report("High occupancy quote", &after);

    check_increase(&before, &after)?;
    info!("Price increased from {:.2} to {:.2}", before.final_price, after.final_price);
    Ok(())
}
