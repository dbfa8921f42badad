// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::handler::RouteTable;

/// Application state
///
/// Built once in `main` and handed to the listener; requests never mutate it.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub const fn new(config: Config, routes: RouteTable) -> Self {
        Self { config, routes }
    }
}
