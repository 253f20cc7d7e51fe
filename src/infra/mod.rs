mod aggregator;
mod catalog;
mod config;
mod locations;
mod log_store;
mod resolver;
mod watch;

pub use aggregator::*;
pub use catalog::*;
pub use config::*;
pub use locations::*;
pub use log_store::*;
pub use resolver::*;
pub use watch::*;
