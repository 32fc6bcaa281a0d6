use std::path::PathBuf;

use tabnest::logging::init_logging;
use tabnest::reminders::{run_scanner, LogSink};
use tabnest::state::AppState;
use tabnest::storage::Storage;

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TABNEST_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tabnest")
}

#[tokio::main]
async fn main() {
    let root = data_dir();
    if let Err(error) = init_logging(&root) {
        eprintln!("failed to initialize logging: {error}");
    }

    let storage = Storage::new(root.clone());
    if let Err(error) = storage.ensure_dirs() {
        log::error!("cannot create data dir {}: {error}", root.display());
        std::process::exit(1);
    }

    let tasks = storage
        .load_tasks()
        .map(|data| data.tasks)
        .unwrap_or_default();
    let settings = storage
        .load_settings()
        .map(|data| data.settings)
        .unwrap_or_default();
    log::info!(
        "loaded {} task(s) from {}",
        tasks.len(),
        root.display()
    );

    let state = AppState::new(tasks, settings);
    run_scanner(state, LogSink).await;
}
