/*
 * Responsibility
 * - 永続化層の公開インターフェース (UserStore / ContactStore と各実装)
 */
pub mod contact_repo;
pub mod error;
pub mod memory;
pub mod user_repo;
