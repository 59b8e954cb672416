use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "carpool",
    about = "Carpool credits — price rides and settle them between riders and drivers",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML credit configuration. Environment variables apply when absent.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Price a ride of the given distance
    Estimate(EstimateArgs),
    /// Settle a completed ride and show the resulting balances
    Settle(SettleArgs),
    /// List fallback rides, optionally filtered
    Rides(RidesArgs),
    /// Join riders onto a fallback ride and settle it
    Demo(DemoArgs),
    /// Post to a ride chat room and list its messages
    Messages(MessagesArgs),
    /// Show the effective credit configuration
    Config,
}

#[derive(Args)]
pub struct EstimateArgs {
    /// Distance in miles
    #[arg(allow_negative_numbers = true)]
    pub miles: Option<f64>,
}

#[derive(Args)]
pub struct SettleArgs {
    #[arg(long)]
    pub ride: String,
    #[arg(long, allow_negative_numbers = true)]
    pub miles: Option<f64>,
    #[arg(long)]
    pub driver: String,
    /// Rider id; repeat for each rider, in charge order
    #[arg(long = "rider")]
    pub riders: Vec<String>,
    /// Apply the same completion this many times
    #[arg(long, default_value = "1")]
    pub times: u32,
}

#[derive(Args)]
pub struct RidesArgs {
    #[arg(long)]
    pub campus_zone: Option<String>,
    #[arg(long)]
    pub origin_zone: Option<String>,
    /// Only rides starting within this many minutes of now
    #[arg(long)]
    pub within: Option<u32>,
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(long, default_value = "ride-1")]
    pub ride: String,
    #[arg(long, default_value = "3.0")]
    pub miles: f64,
    #[arg(long = "rider", default_values_t = vec!["rider-a".to_string(), "rider-b".to_string()])]
    pub riders: Vec<String>,
}

#[derive(Args)]
pub struct MessagesArgs {
    #[arg(long, default_value = "demo-room")]
    pub room: String,
    #[arg(long, default_value_t = carpool_rides::DEFAULT_MESSAGE_LIMIT)]
    pub limit: usize,
    /// Post this message before listing
    #[arg(long)]
    pub send: Option<String>,
    #[arg(long, default_value = "me")]
    pub sender: String,
}
