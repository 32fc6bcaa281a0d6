//! Task lifecycle operations: the surface the popup, dashboard and
//! calendar views drive. Every mutation persists the full task list and
//! broadcasts the updated snapshot through the context.

use std::path::PathBuf;

use crate::models::{NewTask, Settings, Task};
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Host environment seam. Production wires the real data directory and
/// change broadcast; tests substitute their own.
pub trait OpsCtx {
    fn data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_tasks_updated(&self, tasks: &[Task]);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn persist(ctx: &impl OpsCtx, state: &AppState) -> Result<(), StorageError> {
    let storage = Storage::new(ctx.data_dir()?);
    storage.ensure_dirs()?;
    storage.save_tasks(&state.tasks_file())?;
    storage.save_settings(&state.settings_file())?;
    ctx.emit_tasks_updated(&state.tasks());
    Ok(())
}

/// Loads tasks and settings from disk into the state. Missing or
/// unreadable files fall back to an empty list and default settings.
pub fn load_state(ctx: &impl OpsCtx, state: &AppState) -> CommandResult<(Vec<Task>, Settings)> {
    let root = match ctx.data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error}"));
    }
    let tasks = storage
        .load_tasks()
        .map(|data| data.tasks)
        .unwrap_or_default();
    let settings = storage
        .load_settings()
        .map(|data| data.settings)
        .unwrap_or_default();
    state.replace_tasks(tasks.clone());
    state.update_settings(settings.clone());
    ok((tasks, settings))
}

pub fn create_task(ctx: &impl OpsCtx, state: &AppState, draft: NewTask) -> CommandResult<Task> {
    let text = draft.text.trim();
    if text.is_empty() {
        return err("text is required");
    }
    let task = state.add_task(NewTask {
        text: text.to_string(),
        ..draft
    });
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ok(task)
}

pub fn update_task(ctx: &impl OpsCtx, state: &AppState, task: Task) -> CommandResult<Task> {
    if task.text.trim().is_empty() {
        return err("text is required");
    }
    if !state.update_task(task.clone()) {
        return err("task not found");
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ok(task)
}

pub fn toggle_task(ctx: &impl OpsCtx, state: &AppState, task_id: &str) -> CommandResult<Task> {
    let task = match state.toggle_task(task_id) {
        Some(task) => task,
        None => return err("task not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ok(task)
}

pub fn delete_task(ctx: &impl OpsCtx, state: &AppState, task_id: &str) -> CommandResult<bool> {
    state.remove_task(task_id);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ok(true)
}

pub fn delete_tasks(
    ctx: &impl OpsCtx,
    state: &AppState,
    task_ids: &[String],
) -> CommandResult<bool> {
    state.remove_tasks(task_ids);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error}"));
    }
    ok(true)
}

pub fn update_settings(
    ctx: &impl OpsCtx,
    state: &AppState,
    settings: Settings,
) -> CommandResult<Settings> {
    let previous = state.settings();
    state.update_settings(settings.clone());
    if let Err(error) = persist(ctx, state) {
        // Keep the running app consistent with what is actually on disk.
        state.update_settings(previous);
        return err(&format!("storage error: {error}"));
    }
    ok(settings)
}
