// SchemaBridgeライブラリのエントリーポイント
//
// モジュール構造:
// - core: ドメインモデル（ポータブルスキーマ、レコード、方言、エラー、設定）
// - adapters: 方言ごとのSQL生成・型マッピング・イントロスペクション・ドライバー
// - services: ワークフローステップ境界（接続の開閉と結果の分類）
// - cli: コマンドラインインターフェース

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
