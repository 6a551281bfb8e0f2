//! HTTP and WebSocket front end
//!
//! Thin JSON layer over a [`GameHandle`](crate::runtime::GameHandle): queries
//! read the game, commands go through the same lock the ticker uses, and
//! `/ws` streams every [`GameEvent`](crate::game::GameEvent).

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

pub use routes::create_router;
pub use server::ApiServer;
