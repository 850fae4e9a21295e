pub mod config;
pub mod correction;
pub mod error;
pub mod estimator;
pub mod export;
pub mod logging;
pub mod model;
pub mod outcome;
pub mod season;
pub mod seed;
pub mod standings;
pub mod state;
pub mod store;
pub mod week;

pub use error::{LeagueError, LeagueResult};
