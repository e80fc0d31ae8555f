//! Screen time tracker for the terminal. Watches which application is in the foreground,
//! keeps per application and per day totals, warns about applications over their limits and
//! reminds to take breaks.
//!

pub mod cli;
pub mod daemon;
pub mod utils;
pub mod window_api;
