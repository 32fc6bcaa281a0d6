use chrono::{Datelike, NaiveDate};

use crate::models::DateFormat;

/// Human-readable label for a calendar day, used for group titles.
pub fn format_for_display(date: NaiveDate, today: NaiveDate, format: DateFormat) -> String {
    match format {
        DateFormat::Relative => relative(date, today),
        DateFormat::Absolute => absolute(date, today),
    }
}

fn relative(date: NaiveDate, today: NaiveDate) -> String {
    let diff_days = (date - today).num_days();
    match diff_days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d if d <= 7 => format!("In {d} days"),
        _ => absolute(date, today),
    }
}

fn absolute(date: NaiveDate, today: NaiveDate) -> String {
    if date.year() == today.year() {
        date.format("%a, %b %-d").to_string()
    } else {
        date.format("%a, %b %-d, %Y").to_string()
    }
}
