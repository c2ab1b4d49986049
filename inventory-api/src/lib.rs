pub mod config;
pub mod handlers;
pub mod schema;
pub mod server;
pub mod store;
