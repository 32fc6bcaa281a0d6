use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::models::{NewTask, Settings, SettingsFile, Task, TasksFile};

const SCHEMA_VERSION: u32 = 1;

/// Shared in-memory snapshot of the task list and settings. Mutations
/// happen here; the agenda engine only ever reads copies.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(tasks: Vec<Task>, settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData { tasks, settings })),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn tasks_file(&self) -> TasksFile {
        let guard = self.inner.lock().expect("state poisoned");
        TasksFile {
            schema_version: SCHEMA_VERSION,
            tasks: guard.tasks.clone(),
        }
    }

    pub fn settings(&self) -> Settings {
        let guard = self.inner.lock().expect("state poisoned");
        guard.settings.clone()
    }

    pub fn settings_file(&self) -> SettingsFile {
        let guard = self.inner.lock().expect("state poisoned");
        SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: guard.settings.clone(),
        }
    }

    /// Creates a task from user-supplied fields, assigning its id and
    /// creation time.
    pub fn add_task(&self, draft: NewTask) -> Task {
        let now = Utc::now();
        let task = Task {
            id: format!("todo-{}", now.timestamp_micros()),
            text: draft.text,
            description: draft.description,
            completed: false,
            created_at: now,
            due_date: draft.due_date,
            due_time: draft.due_time,
            reminder_days: draft.reminder_days,
            tags: draft.tags,
        };
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.push(task.clone());
        task
    }

    /// Replaces the task with the same id; returns false if no task
    /// matches.
    pub fn update_task(&self, task: Task) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        match guard.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => false,
        }
    }

    pub fn toggle_task(&self, task_id: &str) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.iter_mut().find(|t| t.id == task_id).map(|task| {
            task.completed = !task.completed;
            task.clone()
        })
    }

    pub fn remove_task(&self, task_id: &str) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.retain(|task| task.id != task_id);
    }

    pub fn remove_tasks(&self, task_ids: &[String]) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.retain(|task| !task_ids.contains(&task.id));
    }

    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
    }

    pub fn update_settings(&self, settings: Settings) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.settings = settings;
    }
}

#[derive(Debug)]
struct AppData {
    tasks: Vec<Task>,
    settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_draft(text: &str) -> NewTask {
        NewTask {
            text: text.to_string(),
            description: None,
            due_date: None,
            due_time: None,
            reminder_days: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn add_task_assigns_id_and_created_at() {
        let state = AppState::new(Vec::new(), Settings::default());
        let before = Utc::now();
        let task = state.add_task(make_draft("buy milk"));

        assert!(task.id.starts_with("todo-"));
        assert!(!task.completed);
        assert!(task.created_at >= before);
        assert_eq!(state.tasks().len(), 1);
        assert_eq!(state.tasks()[0].id, task.id);
    }

    #[test]
    fn toggle_task_flips_completion_both_ways() {
        let state = AppState::new(Vec::new(), Settings::default());
        let task = state.add_task(make_draft("x"));

        let toggled = state.toggle_task(&task.id).expect("task exists");
        assert!(toggled.completed);
        let toggled = state.toggle_task(&task.id).expect("task exists");
        assert!(!toggled.completed);

        assert!(state.toggle_task("missing").is_none());
    }

    #[test]
    fn update_task_replaces_by_id() {
        let state = AppState::new(Vec::new(), Settings::default());
        let mut task = state.add_task(make_draft("old"));
        task.text = "new".to_string();

        assert!(state.update_task(task.clone()));
        assert_eq!(state.tasks()[0].text, "new");

        let mut missing = task;
        missing.id = "missing".to_string();
        assert!(!state.update_task(missing));
        assert_eq!(state.tasks().len(), 1);
    }

    #[test]
    fn remove_and_replace_tasks() {
        let state = AppState::new(Vec::new(), Settings::default());
        let a = state.add_task(make_draft("a"));
        let b = state.add_task(make_draft("b"));
        let c = state.add_task(make_draft("c"));

        state.remove_task(&a.id);
        assert!(state.tasks().iter().all(|t| t.id != a.id));

        state.remove_tasks(&[b.id.clone(), c.id.clone()]);
        assert!(state.tasks().is_empty());

        state.replace_tasks(vec![b.clone()]);
        assert_eq!(state.tasks().len(), 1);
        assert_eq!(state.tasks()[0].id, b.id);
    }

    #[test]
    fn tasks_file_and_settings_file_carry_schema_version() {
        let state = AppState::new(Vec::new(), Settings::default());
        assert_eq!(state.tasks_file().schema_version, SCHEMA_VERSION);
        assert_eq!(state.settings_file().schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn update_settings_replaces_previous_value() {
        let state = AppState::new(Vec::new(), Settings::default());
        let mut next = Settings::default();
        next.theme = "dark".to_string();
        state.update_settings(next);
        assert_eq!(state.settings().theme, "dark");
    }
}
