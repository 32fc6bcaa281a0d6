use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local, NaiveTime};

use crate::models::Task;
use crate::state::AppState;

/// How often the scanner wakes up.
pub const SCAN_INTERVAL: StdDuration = StdDuration::from_secs(15 * 60);

const DUE_SOON_WINDOW_HOURS: i64 = 2;

/// Where due-soon hits go. Production logs; hosts with a notification
/// surface plug in their own.
pub trait ReminderSink {
    fn notify(&self, task: &Task);
}

pub struct LogSink;

impl ReminderSink for LogSink {
    fn notify(&self, task: &Task) {
        log::info!("task due soon id={} text={}", task.id, task.text);
    }
}

/// The moment a task is due, on its local calendar day. A parseable
/// "HH:MM" `due_time` overrides the time-of-day of the stored instant.
pub fn due_instant(task: &Task) -> Option<DateTime<Local>> {
    let stored = task.due_date?.with_timezone(&Local);
    let time = task
        .due_time
        .as_deref()
        .and_then(|text| NaiveTime::parse_from_str(text, "%H:%M").ok());
    match time {
        Some(time) => stored
            .date_naive()
            .and_time(time)
            .and_local_timezone(Local)
            .single()
            .or(Some(stored)),
        None => Some(stored),
    }
}

/// Incomplete, dated tasks whose due instant falls within the next two
/// hours. Tasks already past due are the agenda's problem, not the
/// notifier's.
pub fn collect_due_soon(tasks: &[Task], now: DateTime<Local>) -> Vec<Task> {
    let mut due = Vec::new();
    for task in tasks {
        if task.completed {
            continue;
        }
        let Some(instant) = due_instant(task) else {
            continue;
        };
        let until_due = instant - now;
        if until_due > Duration::zero() && until_due <= Duration::hours(DUE_SOON_WINDOW_HOURS) {
            due.push(task.clone());
        }
    }
    due
}

/// Periodic reminder loop: every tick, scan a snapshot of the task list
/// and report each due-soon task to the sink.
pub async fn run_scanner(state: AppState, sink: impl ReminderSink) {
    let mut interval = tokio::time::interval(SCAN_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let due = collect_due_soon(&state.tasks(), Local::now());
        if !due.is_empty() {
            log::debug!("reminder scan matched {} task(s)", due.len());
        }
        for task in &due {
            sink.notify(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    fn make_task(id: &str, due: Option<DateTime<Local>>) -> Task {
        Task {
            id: id.to_string(),
            text: format!("task-{id}"),
            description: None,
            completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            due_date: due.map(|instant| instant.with_timezone(&Utc)),
            due_time: None,
            reminder_days: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn collects_tasks_inside_the_two_hour_window() {
        let now = local(2024, 1, 10, 9, 0);
        let tasks = vec![
            make_task("in-1h", Some(local(2024, 1, 10, 10, 0))),
            make_task("at-2h", Some(local(2024, 1, 10, 11, 0))),
            make_task("in-3h", Some(local(2024, 1, 10, 12, 0))),
            make_task("past", Some(local(2024, 1, 10, 8, 59))),
            make_task("undated", None),
        ];

        let due = collect_due_soon(&tasks, now);
        let ids: Vec<&str> = due.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["in-1h", "at-2h"]);
    }

    #[test]
    fn completed_tasks_are_never_reported() {
        let now = local(2024, 1, 10, 9, 0);
        let mut task = make_task("done", Some(local(2024, 1, 10, 10, 0)));
        task.completed = true;

        assert!(collect_due_soon(&[task], now).is_empty());
    }

    #[test]
    fn due_time_overrides_the_stored_time_of_day() {
        let now = local(2024, 1, 10, 9, 0);
        // Stored instant says noon; due_time pulls it to 10:30, inside
        // the window.
        let mut task = make_task("a", Some(local(2024, 1, 10, 12, 0)));
        task.due_time = Some("10:30".to_string());

        let instant = due_instant(&task).unwrap();
        assert_eq!(instant, local(2024, 1, 10, 10, 30));
        assert_eq!(collect_due_soon(&[task], now).len(), 1);
    }

    #[test]
    fn unparseable_due_time_falls_back_to_the_stored_instant() {
        let mut task = make_task("a", Some(local(2024, 1, 10, 12, 0)));
        task.due_time = Some("noonish".to_string());

        assert_eq!(due_instant(&task).unwrap(), local(2024, 1, 10, 12, 0));
    }

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl ReminderSink for RecordingSink {
        fn notify(&self, task: &Task) {
            self.seen.lock().unwrap().push(task.id.clone());
        }
    }

    #[test]
    fn sink_receives_each_due_task() {
        let now = local(2024, 1, 10, 9, 0);
        let tasks = vec![
            make_task("a", Some(local(2024, 1, 10, 9, 30))),
            make_task("b", Some(local(2024, 1, 10, 10, 45))),
        ];
        let sink = RecordingSink {
            seen: Mutex::new(Vec::new()),
        };

        for task in &collect_due_soon(&tasks, now) {
            sink.notify(task);
        }
        assert_eq!(*sink.seen.lock().unwrap(), vec!["a", "b"]);
    }
}
