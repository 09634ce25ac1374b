#![cfg_attr(not(any(feature = "simulator", test)), no_std)]

pub mod config;
pub mod daemon;
pub mod routing;

pub use config::{ConfigError, RouterConfig};
pub use daemon::{DaemonError, PollSummary, RouterDaemon};
pub use routing::{ForwardingTable, MergeOutcome, Route, RoutingTable, MAX_ROUTES, MAX_TTL};
