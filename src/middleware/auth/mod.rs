/*
 * Responsibility
 * - 認証 gate (access) の公開窓口
 */
pub mod access;
