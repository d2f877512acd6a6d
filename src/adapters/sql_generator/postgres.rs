// PostgreSQL用CREATE TABLEレイアウト

use super::ColumnDefinition;

/// CREATE TABLE文を組み立てる
pub(super) fn render_create_table(table: &str, columns: &[ColumnDefinition]) -> String {
    let elements: Vec<String> = columns
        .iter()
        .map(|c| format!("    {}", c.render()))
        .collect();

    let parts = vec![
        format!("CREATE TABLE {} (", table),
        elements.join(",\n"),
        ")".to_string(),
    ];
    parts.join("\n")
}
