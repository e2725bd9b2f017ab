//! Water-source risk monitoring service.
//!
//! Periodically recalculates a risk score for every monitored water source
//! from rainfall and water-level readings, maintains a bounded trend
//! signal, raises or suppresses alerts, forecasts near-term risk, and fans
//! the result out to a dashboard projection and a realtime broadcast
//! channel.
//!
//! The crate splits into a pure core (`simulate`, `risk`, `analysis`,
//! `alert::engine`, `explain`, `dashboard`) and an effectful shell
//! (`orchestrate`, `scheduler`, `push`, `store`, `realtime`). Pure modules
//! never suspend, never do I/O, and never return errors; the shell isolates
//! failures at the smallest safe granularity — per recipient for
//! notifications, per cycle for batch persistence.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod explain;
pub mod logging;
pub mod model;
pub mod orchestrate;
pub mod push;
pub mod realtime;
pub mod risk;
pub mod scheduler;
pub mod seed;
pub mod simulate;
pub mod store;
