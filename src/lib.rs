pub mod config;
pub mod constants;
pub mod extractors;
pub mod insights;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod workers;
