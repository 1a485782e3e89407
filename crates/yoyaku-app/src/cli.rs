use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use yoyaku_core::config::Settings;
use yoyaku_core::types::Recurrence;
use yoyaku_core::util::datetime::parse_date;
use yoyaku_service::{BookingRequest, Scheduler, ServiceError};

use crate::error::AppResult;
use crate::render;

#[derive(Debug, Parser)]
#[command(name = "yoyaku", version, about = "Book time slots without double-booking")]
pub struct Cli {
    /// Configuration file (defaults to ./yoyaku.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Booking file, overriding `storage.path`
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log filter, overriding `logging.level` (e.g. `debug`, `yoyaku_engine=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a booking unless it overlaps an existing one
    Add {
        name: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Start time as HH:MM (24-hour)
        #[arg(long)]
        time: String,
        /// Length in minutes (default from configuration)
        #[arg(long, conflicts_with = "end")]
        duration: Option<u32>,
        /// End time as HH:MM on the same date
        #[arg(long)]
        end: Option<String>,
        /// Repeat the booking
        #[arg(long, requires = "until", value_parser = ["weekly", "monthly", "yearly"])]
        repeat: Option<String>,
        /// Last date of the repetition (YYYY-MM-DD, inclusive)
        #[arg(long, requires = "repeat")]
        until: Option<String>,
    },
    /// List every stored booking
    List,
    /// Show a month with booked days marked
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Show the bookings on one day
    Day {
        /// Date as YYYY-MM-DD
        date: String,
    },
}

impl Cli {
    /// Applies command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(store) = &self.store {
            settings.storage.path.clone_from(store);
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

/// ## Summary
/// Executes one command.
///
/// Rejected input and scheduling conflicts are reported on stdout and turn
/// into a failing exit code; they are not errors of the program itself.
///
/// ## Errors
/// Returns storage and expansion failures.
pub fn run(command: &Command, scheduler: &mut Scheduler) -> AppResult<ExitCode> {
    match command {
        Command::Add {
            name,
            date,
            time,
            duration,
            end,
            repeat,
            until,
        } => {
            let mut request = BookingRequest::new(name.as_str(), date.as_str(), time.as_str());
            if let Some(minutes) = duration {
                request = request.with_duration(*minutes);
            }
            if let Some(end) = end {
                request = request.with_end_time(end.as_str());
            }
            if let (Some(repeat), Some(until)) = (repeat, until) {
                request = request.with_recurrence(repeat.as_str(), until.as_str());
            }
            add(scheduler, &request)
        }
        Command::List => {
            println!("{}", render::booking_list(scheduler.bookings()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Calendar { year, month } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let agenda = scheduler.month_agenda(year, month)?;
            println!("{}", render::month_calendar(year, month, &agenda)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Day { date } => {
            let date = match parse_date(date) {
                Ok(date) => date,
                Err(err) => {
                    println!("{err}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            let agenda = scheduler.day_agenda(date)?;
            println!("{}", render::day_list(date, agenda.on(date)));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn add(scheduler: &mut Scheduler, request: &BookingRequest) -> AppResult<ExitCode> {
    match scheduler.submit(request) {
        Ok(booking) => {
            println!("Booking added: {}", booking.name);
            if let Recurrence::Rule(rule) = &booking.recurrence {
                println!("Recurring {} until {}", rule.frequency, rule.until);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(ServiceError::SchedulingConflict(existing)) => {
            println!("Conflict detected with existing booking:");
            match &existing.recurrence {
                Recurrence::Rule(rule) => {
                    println!("Recurring booking: {} ({})", existing.name, rule.frequency);
                }
                Recurrence::None => println!("Single booking: {}", existing.name),
            }
            Ok(ExitCode::FAILURE)
        }
        Err(err @ (ServiceError::SelfOverlappingSeries { .. } | ServiceError::CoreError(_))) => {
            println!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
