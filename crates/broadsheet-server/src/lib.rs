pub mod app;
pub mod error;
pub mod links;
pub mod routes;
pub mod session;
pub mod state;
