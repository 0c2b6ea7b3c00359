pub mod config;
pub mod logging;

pub mod driver;
pub mod poller;
pub mod retry;
pub mod schedule_db;
pub mod trigger;
pub mod worker;
