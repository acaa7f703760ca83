/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - decode ロジックや AppState 参照はここに置かない
 */
use super::core::PublicId;

// contacts
pub enum ContactTag {}
pub type PublicContactId = PublicId<ContactTag>;
