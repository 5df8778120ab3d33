// handlers/mod.rs - HTTP handlers
//
// pages.rs  <- page payloads, mounted behind the route guard
// auth.rs   <- session lifecycle API (login, refresh, logout, callback)
// health.rs <- liveness

pub mod auth;
pub mod health;
pub mod pages;
