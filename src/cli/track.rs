use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    store::kv::KvStore,
    tracker::{
        entities::{DailyRecord, Metric},
        keys::date_string,
        today::TodayTracker,
    },
    utils::clock::DefaultClock,
};

use super::confirm;

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Calories to add. Negative values remove, clamped at zero"
    )]
    calories: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Grams of protein to add. Negative values remove, clamped at zero"
    )]
    protein: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Miles to add. Negative values remove, clamped at zero"
    )]
    miles: Option<f64>,
}

/// Command to process `log`. Applies the given deltas to today's counters and persists the
/// result. Multiple deltas in one invocation end up in a single store write.
pub async fn process_log_command(store: Arc<dyn KvStore>, command: LogCommand) -> Result<()> {
    let LogCommand {
        calories,
        protein,
        miles,
    } = command;

    let mut tracker = TodayTracker::new(store, Box::new(DefaultClock));
    tracker.init().await;

    let deltas = [
        (Metric::Calories, calories),
        (Metric::Protein, protein),
        (Metric::Miles, miles),
    ];
    let mut logged_any = false;
    for (metric, delta) in deltas {
        if let Some(delta) = delta {
            tracker.adjust(metric, delta).await;
            logged_any = true;
        }
    }

    if logged_any {
        tracker.flush().await;
    } else {
        println!("Nothing to log, see `fittrack log --help` for the available counters.\n");
    }

    print_day(tracker.today(), &tracker.snapshot().await);
    Ok(())
}

/// Command to process `today`. Prints the counters without writing a record.
pub async fn process_today_command(store: Arc<dyn KvStore>) -> Result<()> {
    let mut tracker = TodayTracker::new(store, Box::new(DefaultClock));
    tracker.init().await;

    print_day(tracker.today(), &tracker.snapshot().await);
    Ok(())
}

/// Command to process `reset`. Confirms, then zeroes today's counters and deletes the record.
pub async fn process_reset_command(store: Arc<dyn KvStore>, assume_yes: bool) -> Result<()> {
    if !confirm("Clear today's data?", assume_yes)? {
        println!("Aborted");
        return Ok(());
    }

    let mut tracker = TodayTracker::new(store, Box::new(DefaultClock));
    tracker.init().await;
    tracker.reset().await;

    println!("Cleared {}", date_string(tracker.today()));
    Ok(())
}

pub(crate) fn print_day(date: NaiveDate, record: &DailyRecord) {
    println!("{}", date_string(date));
    println!("  {} cal", format_amount(record.calories));
    println!("  {} g protein", format_amount(record.protein));
    println!("  {} miles", format_amount(record.miles));
}

/// Whole amounts print without a fraction, everything else as entered.
pub(crate) fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
