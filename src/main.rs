use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use rate_scout::{ChromeFetcher, DateRange, FetchOptions, OpenAiChat, Pipeline, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compare room prices for the hotel across Booking.com, Agoda and Goibibo
#[derive(Debug, Parser)]
#[command(name = "rate-scout", version)]
struct Cli {
    /// Check-in date (YYYY-MM-DD), defaults to tomorrow
    #[arg(long)]
    checkin: Option<NaiveDate>,

    /// Check-out date (YYYY-MM-DD), defaults to the day after check-in
    #[arg(long)]
    checkout: Option<NaiveDate>,

    /// Where to save the results as JSON
    #[arg(short, long, default_value = "hotel_prices.json")]
    output: PathBuf,

    /// Print the deep links and exit
    #[arg(long)]
    links_only: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let checkin = cli
        .checkin
        .unwrap_or_else(|| Local::now().date_naive() + Duration::days(1));
    let checkout = cli.checkout.unwrap_or(checkin + Duration::days(1));
    let range = DateRange::new(checkin, checkout)?;

    info!("🛎️ Hotel Price Extractor");
    info!("Stay: {} -> {} ({} nights)", range.checkin(), range.checkout(), range.nights());

    if cli.links_only {
        for (site, url) in rate_scout::links::build_links_for(&range, &settings)? {
            println!("{}: {}", site, url);
        }
        return Ok(());
    }

    // Credential problems stop the run before any site is touched
    let model = OpenAiChat::from_env(settings.model.clone())
        .context("Language model is not configured")?;

    let mut fetch_options = FetchOptions::from(&settings);
    fetch_options.headless = !cli.headful;

    let pipeline = Pipeline::new(ChromeFetcher::new(fetch_options), Arc::new(model), settings);
    let results = pipeline.run(&range).await?;

    println!();
    print!("{}", rate_scout::report::render_text(&results));
    println!();

    rate_scout::report::write_json(&cli.output, &results).await?;

    Ok(())
}
