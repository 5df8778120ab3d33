pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;
