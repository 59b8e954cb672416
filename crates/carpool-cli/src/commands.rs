use anyhow::Context;
use carpool_credits::{
    CreditConfig, CreditReader, CreditWriter, Credits, InMemoryCreditLedger, RideCompletion,
    RideSettlement,
};
use carpool_rides::{
    list_messages_or_fallback, InMemoryMessageStore, InMemoryRideStore, MessageStore, Ride,
    RideQuery, RideStore,
};
use carpool_types::{RideId, UserId};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Estimate(args) => cmd_estimate(&config, args, &cli.format),
        Command::Settle(args) => cmd_settle(config, args, &cli.format),
        Command::Rides(args) => cmd_rides(args, &cli.format),
        Command::Demo(args) => cmd_demo(config, args, &cli.format),
        Command::Messages(args) => cmd_messages(args, &cli.format),
        Command::Config => cmd_config(&config, &cli.format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CreditConfig> {
    match &cli.config {
        Some(path) => CreditConfig::from_toml_file(path)
            .with_context(|| format!("loading credit config from {}", path.display())),
        None => Ok(CreditConfig::from_env()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    settlements: Vec<RideSettlement>,
    balances: Vec<BalanceLine>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceLine {
    user_id: UserId,
    balance: Credits,
    weekly_earned: Credits,
}

fn cmd_estimate(
    config: &CreditConfig,
    args: EstimateArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let credits = config.estimate_credits(args.miles);
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "distanceMiles": args.miles,
            "credits": credits,
        })),
        OutputFormat::Text => {
            let miles = args.miles.map(|m| m.to_string()).unwrap_or_else(|| "-".into());
            println!("{} mi → {} credits", miles, credits.to_string().bold());
            Ok(())
        }
    }
}

fn cmd_settle(
    config: CreditConfig,
    args: SettleArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let completion = RideCompletion {
        ride_id: RideId::parse(&args.ride)?,
        distance_miles: args.miles,
        rider_ids: args
            .riders
            .iter()
            .map(|r| UserId::parse(r))
            .collect::<Result<_, _>>()?,
        driver_id: UserId::parse(&args.driver)?,
    };

    let ledger = InMemoryCreditLedger::new(config);
    let settlements = (0..args.times)
        .map(|_| ledger.process_ride_completion(&completion))
        .collect::<Result<Vec<_>, _>>()?;
    report(&ledger, settlements, format)
}

fn cmd_rides(args: RidesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = InMemoryRideStore::with_fallback();
    let mut query = RideQuery::default();
    if let Some(zone) = args.campus_zone {
        query = query.campus_zone(zone);
    }
    if let Some(zone) = args.origin_zone {
        query = query.origin_zone(zone);
    }
    if let Some(minutes) = args.within {
        query = query.around(Utc::now(), Some(minutes));
    }
    let rides = store.list_rides(&query)?;

    match format {
        OutputFormat::Json => print_json(&rides),
        OutputFormat::Text => {
            if rides.is_empty() {
                println!("No rides match.");
            }
            for ride in &rides {
                print_ride(ride);
            }
            Ok(())
        }
    }
}

fn print_ride(ride: &Ride) {
    println!(
        "{}  {} → {}  {}",
        ride.ride_id.as_str().yellow().bold(),
        ride.origin,
        ride.campus_zone,
        ride.start_time.format("%H:%M").to_string().cyan(),
    );
    println!(
        "  Driver: {} ({})  Seats: {}/{}  Repeats: {}",
        ride.driver_name,
        ride.driver_id,
        ride.seats_available,
        ride.seats_total,
        ride.recurrence.join(" "),
    );
}

fn cmd_demo(config: CreditConfig, args: DemoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = InMemoryRideStore::with_fallback();
    let ride_id = RideId::parse(&args.ride)?;
    for rider in &args.riders {
        let receipt = store.join_ride(&ride_id, &UserId::parse(rider)?)?;
        if *format == OutputFormat::Text {
            println!("{} {} joined {}", "✓".green(), receipt.user_id, receipt.ride_id);
        }
    }
    let ride = store
        .get_ride(&ride_id)?
        .with_context(|| format!("ride {ride_id} disappeared"))?;

    let ledger = InMemoryCreditLedger::new(config);
    let settlement = ledger.process_ride_completion(&ride.completion(Some(args.miles)))?;
    report(&ledger, vec![settlement], format)
}

fn cmd_messages(args: MessagesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let store = InMemoryMessageStore::with_fallback();
    if let Some(body) = &args.send {
        store.send_message(&args.room, &args.sender, body)?;
    }
    let messages = list_messages_or_fallback(&store, &args.room, args.limit);

    match format {
        OutputFormat::Json => print_json(&messages),
        OutputFormat::Text => {
            if messages.is_empty() {
                println!("No messages in {}.", args.room);
            }
            for message in &messages {
                println!(
                    "{} {}: {}",
                    message.created_at.format("%H:%M").to_string().cyan(),
                    message.sender.bold(),
                    message.body,
                );
            }
            Ok(())
        }
    }
}

fn cmd_config(config: &CreditConfig, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Text => {
            println!("Rate per mile:   {}", config.rate_per_mile.to_string().bold());
            println!("Weekly earn cap: {}", config.weekly_earn_cap.to_string().bold());
            let floor = config
                .overdraft_floor
                .map(|f| f.to_string())
                .unwrap_or_else(|| "none".into());
            println!("Overdraft floor: {floor}");
            println!("Dedupe rides:    {}", config.dedupe_rides);
            println!("Week rollover:   {}", config.auto_week_rollover);
            Ok(())
        }
    }
}

fn report(
    ledger: &InMemoryCreditLedger,
    settlements: Vec<RideSettlement>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let balances = ledger
        .balances()?
        .into_iter()
        .map(|(user_id, balance)| -> anyhow::Result<BalanceLine> {
            let weekly_earned = ledger.weekly_earned(&user_id)?;
            Ok(BalanceLine {
                user_id,
                balance,
                weekly_earned,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if *format == OutputFormat::Json {
        return print_json(&Report {
            settlements,
            balances,
        });
    }

    for settlement in &settlements {
        let capped = if settlement.is_capped() {
            " (capped)".red().to_string()
        } else {
            String::new()
        };
        println!(
            "{} Ride settled: {} credits per rider, driver earned {}{}",
            "✓".green().bold(),
            settlement.amount.to_string().bold(),
            settlement.driver_earned.to_string().bold(),
            capped,
        );
        for tx in &settlement.transactions {
            let delta = format!("{:+}", tx.delta);
            let delta = if tx.is_spend() { delta.red() } else { delta.green() };
            println!("  {:<12} {:>6}  {}", tx.user_id.as_str(), delta, tx.ride_id);
        }
    }
    println!("Balances:");
    for line in &balances {
        println!(
            "  {:<12} {:>6}  (earned this week: {})",
            line.user_id.as_str(),
            line.balance,
            line.weekly_earned
        );
    }
    Ok(())
}
