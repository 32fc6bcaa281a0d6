//! Task visibility and grouping.
//!
//! Everything here is pure: the caller passes the reference day and
//! "today" explicitly, so the same inputs always produce the same
//! groups. Days are local calendar days, midnight to midnight.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::datefmt::format_for_display;
use crate::models::{DateFormat, FilterMode, Task, ViewMode};

/// How many most-recent completed date-groups are kept in the output.
const COMPLETED_GROUP_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    Overdue,
    Today,
    Upcoming,
    NoDate,
    Completed,
}

/// A titled, typed run of tasks sharing a visibility classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskGroup {
    pub title: String,
    pub tasks: Vec<Task>,
    pub kind: GroupType,
}

/// The calendar day an instant falls on, in local time.
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// First day (Sunday) of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Whether a task belongs on the view for `target_date`.
///
/// Undated tasks are always relevant. Completed tasks appear only on
/// their own due day. Incomplete overdue tasks never drop out of view.
/// Everything else shows on its due day, widened by the reminder lead
/// time when one is set.
pub fn should_show_task_for_date(task: &Task, target_date: NaiveDate, today: NaiveDate) -> bool {
    let due = match task.due_date {
        Some(instant) => local_day(instant),
        None => return true,
    };

    if task.completed {
        return target_date == due;
    }

    if due < today {
        return true;
    }

    match task.reminder_days {
        None | Some(0) => target_date == due,
        Some(days) => {
            let reminder_start = due - Duration::days(i64::from(days));
            reminder_start <= target_date && target_date <= due
        }
    }
}

/// True while an incomplete task is showing early because of its
/// reminder lead time. The due day itself is excluded: on that day the
/// task is due, not upcoming. Used for badges, never for filtering.
pub fn is_task_reminder_active(task: &Task, current_date: NaiveDate) -> bool {
    if task.completed {
        return false;
    }
    let due = match task.due_date {
        Some(instant) => local_day(instant),
        None => return false,
    };
    let days = match task.reminder_days {
        Some(days) if days > 0 => days,
        _ => return false,
    };
    let reminder_start = due - Duration::days(i64::from(days));
    reminder_start <= current_date && current_date < due
}

pub fn apply_filter(tasks: &[Task], mode: FilterMode) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match mode {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        })
        .cloned()
        .collect()
}

/// Builds the ordered, titled group list for one render.
///
/// Output order is fixed: overdue (oldest due day first), due on the
/// reference day, reminder-window, upcoming, undated, then at most the
/// two most recent completed date-groups.
pub fn organize_todos_by_date(
    tasks: &[Task],
    reference_date: NaiveDate,
    view_mode: ViewMode,
    date_format: DateFormat,
    today: NaiveDate,
) -> Vec<TaskGroup> {
    let relevant: Vec<&Task> = match view_mode {
        ViewMode::Day => tasks
            .iter()
            .filter(|task| should_show_task_for_date(task, reference_date, today))
            .collect(),
        ViewMode::Week => {
            let start = week_start(reference_date);
            tasks
                .iter()
                .filter(|task| {
                    (0..7).any(|offset| {
                        should_show_task_for_date(task, start + Duration::days(offset), today)
                    })
                })
                .collect()
        }
    };

    let (active, completed): (Vec<&Task>, Vec<&Task>) =
        relevant.into_iter().partition(|task| !task.completed);

    let mut overdue: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
    let mut due_on_reference: Vec<Task> = Vec::new();
    let mut reminding: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
    let mut upcoming: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
    let mut no_date: Vec<Task> = Vec::new();

    for task in active {
        let due = match task.due_date {
            Some(instant) => local_day(instant),
            None => {
                no_date.push(task.clone());
                continue;
            }
        };
        if due < today {
            overdue.entry(due).or_default().push(task.clone());
        } else if due == reference_date {
            due_on_reference.push(task.clone());
        } else if is_task_reminder_active(task, reference_date) {
            reminding.entry(due).or_default().push(task.clone());
        } else {
            upcoming.entry(due).or_default().push(task.clone());
        }
    }

    let title_for = |day: NaiveDate| format_for_display(day, today, date_format);
    let mut groups = Vec::new();

    for (due, mut members) in overdue {
        sort_group(&mut members);
        groups.push(TaskGroup {
            title: title_for(due),
            tasks: members,
            kind: GroupType::Overdue,
        });
    }

    if !due_on_reference.is_empty() {
        sort_group(&mut due_on_reference);
        groups.push(TaskGroup {
            title: title_for(reference_date),
            tasks: due_on_reference,
            kind: GroupType::Today,
        });
    }

    for (due, mut members) in reminding {
        sort_group(&mut members);
        groups.push(TaskGroup {
            title: format!("{} (Reminder)", title_for(due)),
            tasks: members,
            kind: GroupType::Upcoming,
        });
    }

    for (due, mut members) in upcoming {
        sort_group(&mut members);
        groups.push(TaskGroup {
            title: title_for(due),
            tasks: members,
            kind: GroupType::Upcoming,
        });
    }

    if !no_date.is_empty() {
        sort_group(&mut no_date);
        groups.push(TaskGroup {
            title: "No Due Date".to_string(),
            tasks: no_date,
            kind: GroupType::NoDate,
        });
    }

    // Completed tasks group by due day too; undated completed tasks have
    // no day to hang a group on and are not emitted.
    let mut completed_by_day: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
    for task in completed {
        if let Some(instant) = task.due_date {
            completed_by_day
                .entry(local_day(instant))
                .or_default()
                .push(task.clone());
        }
    }
    for (due, mut members) in completed_by_day
        .into_iter()
        .rev()
        .take(COMPLETED_GROUP_LIMIT)
    {
        sort_group(&mut members);
        groups.push(TaskGroup {
            title: format!("{} (Completed)", title_for(due)),
            tasks: members,
            kind: GroupType::Completed,
        });
    }

    groups
}

pub fn empty_state_message(
    reference_date: NaiveDate,
    view_mode: ViewMode,
    today: NaiveDate,
) -> String {
    if view_mode == ViewMode::Week {
        return "No tasks for this week".to_string();
    }
    if reference_date == today {
        return "No tasks due today".to_string();
    }
    format!(
        "No tasks due on {}",
        format_for_display(reference_date, today, DateFormat::Relative)
    )
}

// Due date ascending; ties and undated tasks newest-created first.
fn sort_group(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(left), Some(right)) => left
            .cmp(&right)
            .then_with(|| b.created_at.cmp(&a.created_at)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    });
}
