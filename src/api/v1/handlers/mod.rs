/*
 * Responsibility
 * - v1 handler の公開窓口
 */
pub mod admin;
pub mod auth;
pub mod contacts;
pub mod health;
