// Services Layer
// ワークフローステップの境界：接続の開閉と結果の報告

pub mod step;
pub mod table_service;
