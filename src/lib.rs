pub mod authz;
pub mod error;
pub mod fruits;
pub mod server;
pub mod service;
pub mod session;
pub mod users;
