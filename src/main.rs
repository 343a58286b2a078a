use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use buyables::app::age_secs;
use buyables::util::format::{format_gp, format_xp};
use buyables::util::version::{version_label, APP_NAME};
use buyables::{Buyables, BuyablesReport, CacheStatus, Settings};

#[derive(Parser)]
#[command(name = "buyables", version, about = "Gold-per-XP rankings from live GE prices")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported skills.
    Skills,
    /// Rank a skill's training methods, cheapest per XP first.
    Rank {
        skill: String,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
        /// Show only the first N rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Re-rank a skill on an interval, reusing cached prices between refreshes.
    Watch {
        skill: String,
        /// Seconds between refreshes.
        #[arg(long, default_value_t = 60)]
        every: u64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search the item id to name mapping.
    Mapping {
        /// Case-insensitive substring to match against item names.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    settings.logging.init();
    tracing::debug!(version = %version_label(), "starting {APP_NAME}");

    let service = Buyables::from_settings(&settings)?;

    match cli.command {
        Command::Skills => {
            for skill in service.available_skills() {
                println!("{skill}");
            }
        }
        Command::Rank { skill, json, limit } => {
            let report = service.buyables_for_skill(&skill).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, limit);
            }
        }
        Command::Watch {
            skill,
            every,
            limit,
        } => {
            let sweeper = service.spawn_sweeper(&settings);
            let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.buyables_for_skill(&skill).await {
                            Ok(report) => print_report(&report, limit),
                            Err(err) if err.is_client_error() => return Err(err.into()),
                            Err(err) => tracing::error!(error = %err, "refresh failed"),
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            sweeper.abort();
        }
        Command::Mapping { search, json } => {
            let mapping = service.item_mapping().await?;
            let needle = search.map(|s| s.to_lowercase());
            let matches: Vec<_> = mapping
                .data
                .iter()
                .filter(|item| {
                    needle
                        .as_deref()
                        .map(|n| item.name.to_lowercase().contains(n))
                        .unwrap_or(true)
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for item in matches {
                    let limit = item
                        .limit
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:>6}  {:<40} limit {limit}", item.id, item.name);
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &BuyablesReport, limit: Option<usize>) {
    let freshness = match report.price_status {
        CacheStatus::Fresh => "fresh".to_string(),
        CacheStatus::Cached => "cached".to_string(),
        CacheStatus::Stale => format!(
            "STALE, {}s old",
            age_secs(report.prices_fetched_at.into())
        ),
    };
    println!("{} ({} prices)", report.skill, freshness);
    println!(
        "{:<4} {:<28} {:>4} {:>7} {:>9} {:>9} {:>9} {:>8}",
        "#", "Item", "Lvl", "XP", "Sell", "Cost", "Profit", "GP/XP"
    );

    let shown = limit.unwrap_or(report.items.len());
    for (rank, item) in report.items.iter().take(shown).enumerate() {
        println!(
            "{:<4} {:<28} {:>4} {:>7} {:>9} {:>9} {:>9} {:>8.2}",
            rank + 1,
            item.name,
            item.level,
            format_xp(item.xp_gained),
            format_gp(item.sell_price),
            format_gp(item.material_cost),
            format_gp(item.net_profit),
            item.price_per_xp
        );
    }
}
