// SQLite用CREATE TABLEレイアウト
//
// 1カラム1行、行末カンマ。SQLiteはこのテキストをそのまま sqlite_master に保存し、
// イントロスペクション時に sqlite_ddl_parser が読み戻します。

use super::ColumnDefinition;

/// CREATE TABLE文を組み立てる
pub(super) fn render_create_table(table: &str, columns: &[ColumnDefinition]) -> String {
    let elements: Vec<String> = columns
        .iter()
        .map(|c| format!("\t{}", c.render()))
        .collect();

    format!("CREATE TABLE {} (\n{}\n)", table, elements.join(",\n"))
}
