/*
 * Responsibility
 * - 業務ロジック層 (認証コア / contact / 公開 ID 変換)
 */
pub mod auth;
pub mod contacts;
pub mod id_codec;
