// Core Domain
// ポータブルスキーマ・レコード・方言・エラーの純粋なドメインモデル

pub mod config;
pub mod error;
pub mod record;
pub mod schema;
