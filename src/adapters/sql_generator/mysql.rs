// MySQL / MariaDB用CREATE TABLEレイアウト
//
// 識別子はクォートせず、1行で出力します。

use super::ColumnDefinition;

/// CREATE TABLE文を組み立てる
pub(super) fn render_create_table(table: &str, columns: &[ColumnDefinition]) -> String {
    let elements: Vec<String> = columns.iter().map(ColumnDefinition::render).collect();
    format!("CREATE TABLE {} ({})", table, elements.join(", "))
}
