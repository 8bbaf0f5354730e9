pub mod rates;
pub mod setup;
pub mod ui;
pub mod watch;
