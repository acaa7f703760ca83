/*
 * Responsibility
 * - v1 の公開ポイント (routes() / health_routes() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{health_routes, routes};
