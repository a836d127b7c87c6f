pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod rank;
pub mod scenario;
pub mod scoring;
