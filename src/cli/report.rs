use std::{fmt::Display, sync::Arc};

use anyhow::Result;
use chrono::Local;
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;

use crate::{
    store::kv::KvStore,
    tracker::{
        aggregate::{compute_average, AverageSummary},
        history::list_all,
        keys::date_string,
    },
    utils::clock::{Clock, DefaultClock},
};

use super::{track::format_amount, Args};

const WEEKLY_WINDOW: u32 = 7;
const MONTHLY_WINDOW: u32 = 30;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct AveragesCommand {
    #[arg(
        long,
        help = "Average over the last N days instead of the weekly and monthly windows"
    )]
    window: Option<u32>,
}

/// Command to process `averages`. Windows end today; days without logged activity don't count.
pub async fn process_averages_command(
    store: Arc<dyn KvStore>,
    AveragesCommand { window }: AveragesCommand,
) -> Result<()> {
    let today = DefaultClock.today();

    match window {
        Some(window) => {
            let summary = compute_average(store, today, window).await;
            print_summary(&format!("Average (last {window} days)"), &summary);
        }
        None => {
            let weekly = compute_average(store.clone(), today, WEEKLY_WINDOW).await;
            let monthly = compute_average(store, today, MONTHLY_WINDOW).await;
            print_summary(
                &format!("Weekly average (last {WEEKLY_WINDOW} days)"),
                &weekly,
            );
            println!();
            print_summary(
                &format!("Monthly average (last {MONTHLY_WINDOW} days)"),
                &monthly,
            );
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(
        long,
        short,
        help = "Only show days from this date on. Examples are \"yesterday\", \"2 weeks ago\", \"15/03/2025\""
    )]
    since: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to process `history`. Lists recorded days in reverse-chronological order.
pub async fn process_history_command(
    store: Arc<dyn KvStore>,
    HistoryCommand { since, date_style }: HistoryCommand,
) -> Result<()> {
    let now = Local::now();
    let since = match since.map(|s| parse_date_string(&s, now, date_style.into())) {
        Some(Ok(v)) => Some(v.with_timezone(&Local).beginning_of_day().date_naive()),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to parse since date {e}"),
                )
                .into());
        }
        None => None,
    };

    let mut entries = list_all(store).await?;
    if let Some(since) = since {
        entries.retain(|entry| entry.date >= since);
    }

    if entries.is_empty() {
        println!("No data yet. Log today's stats with `fittrack log`.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}\t{} cal\t{} g\t{} mi",
            date_string(entry.date),
            format_amount(entry.record.calories),
            format_amount(entry.record.protein),
            format_amount(entry.record.miles),
        );
    }
    Ok(())
}

fn print_summary(title: &str, summary: &AverageSummary) {
    println!("{title}");
    println!("  {} cal", summary.calories);
    println!("  {} g protein", summary.protein);
    println!("  {:.1} miles", summary.miles);
    let unit = if summary.days_counted == 1 {
        "day"
    } else {
        "days"
    };
    println!("  over {} active {unit}", summary.days_counted);
}
