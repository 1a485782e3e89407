//! Plain-text views printed by the CLI.

use chrono::{Datelike, Months, NaiveDate};
use yoyaku_core::types::{Booking, Recurrence};
use yoyaku_engine::{Agenda, AgendaEntry};

use crate::error::{AppError, AppResult};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
const TIME_FORMAT: &str = "%H:%M";
const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const BOOKED_MARK: char = '*';

/// Every stored booking as a table, in store order.
#[must_use]
pub fn booking_list(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "No bookings.".to_string();
    }

    let rows: Vec<Vec<String>> = bookings
        .iter()
        .map(|booking| {
            vec![
                booking.name.clone(),
                booking.start.format(DISPLAY_FORMAT).to_string(),
                booking.end.format(DISPLAY_FORMAT).to_string(),
                describe_recurrence(&booking.recurrence),
            ]
        })
        .collect();
    table(&["Name", "Start", "End", "Recurrence"], &rows)
}

/// ## Summary
/// Monday-first month grid with booked days marked `*`.
///
/// ## Errors
/// Returns `InvalidMonth` if `year`/`month` do not name a calendar month.
pub fn month_calendar(year: i32, month: u32, agenda: &Agenda<'_>) -> AppResult<String> {
    let invalid = || AppError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(invalid)?;

    let mut cells: Vec<String> = (0..first.weekday().num_days_from_monday())
        .map(|_| " ".repeat(4))
        .collect();
    for day in first.iter_days().take_while(|day| *day < next) {
        let mark = if agenda.on(day).is_empty() {
            ' '
        } else {
            BOOKED_MARK
        };
        cells.push(format!("{:>3}{mark}", day.day()));
    }

    let title = first.format("%B %Y").to_string();
    let mut lines = vec![
        format!("{title:^27}").trim_end().to_string(),
        WEEKDAYS
            .iter()
            .map(|weekday| format!("{weekday:>3}"))
            .collect::<Vec<_>>()
            .join(" "),
    ];
    lines.extend(
        cells
            .chunks(7)
            .map(|week| week.concat().trim_end().to_string()),
    );
    lines.push(String::new());
    lines.push(format!("{BOOKED_MARK} booked"));

    Ok(lines.join("\n"))
}

/// Occurrences on one day, earliest first.
#[must_use]
pub fn day_list(date: NaiveDate, entries: &[AgendaEntry<'_>]) -> String {
    if entries.is_empty() {
        return format!("No bookings on {}.", date.format("%Y-%m-%d"));
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                format!(
                    "{}-{}",
                    entry.occurrence.start.format(TIME_FORMAT),
                    entry.occurrence.end.format(TIME_FORMAT)
                ),
                entry.booking.name.clone(),
                describe_recurrence(&entry.booking.recurrence),
            ]
        })
        .collect();
    format!(
        "Bookings on {}:\n{}",
        date.format("%A, %Y-%m-%d"),
        table(&["Time", "Name", "Recurrence"], &rows)
    )
}

fn describe_recurrence(recurrence: &Recurrence) -> String {
    match recurrence {
        Recurrence::None => "-".to_string(),
        Recurrence::Rule(rule) => format!("{} until {}", rule.frequency, rule.until.date()),
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");

    let mut lines = vec![
        border.clone(),
        table_row(headers.iter().copied(), &widths),
        border.clone(),
    ];
    for row in rows {
        lines.push(table_row(row.iter().map(String::as_str), &widths));
    }
    lines.push(border);
    lines.join("\n")
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells = cells
        .zip(widths)
        .map(|(cell, &width)| format!(" {cell:<width$} "))
        .collect::<Vec<_>>()
        .join("|");
    format!("|{cells}|")
}
