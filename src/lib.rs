pub mod agenda;
pub mod datefmt;
pub mod logging;
pub mod models;
pub mod ops;
pub mod reminders;
pub mod state;
pub mod storage;
