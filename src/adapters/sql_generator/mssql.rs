// SQL Server用CREATE TABLEレイアウト
//
// T-SQLの慣習に合わせて行頭カンマで列を並べます。

use super::ColumnDefinition;

/// CREATE TABLE文を組み立てる
pub(super) fn render_create_table(table: &str, columns: &[ColumnDefinition]) -> String {
    let mut lines = vec![format!("CREATE TABLE {}", table), "(".to_string()];

    for (i, column) in columns.iter().enumerate() {
        let lead = if i == 0 { "  " } else { ", " };
        lines.push(format!("\t{}{}", lead, column.render()));
    }

    lines.push(")".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mssql_layout_uses_leading_commas() {
        let columns = vec![
            ColumnDefinition {
                name: r#""Id""#.to_string(),
                native_type: "INT",
                null_clause: "NOT NULL",
            },
            ColumnDefinition {
                name: r#""CreatedAt""#.to_string(),
                native_type: "DATETIME2",
                null_clause: "NULL",
            },
        ];

        let sql = render_create_table(r#""Orders""#, &columns);
        let lines: Vec<&str> = sql.lines().collect();
        assert_eq!(lines[0], r#"CREATE TABLE "Orders""#);
        assert_eq!(lines[1], "(");
        assert_eq!(lines[2], "\t  \"Id\" INT NOT NULL");
        assert_eq!(lines[3], "\t, \"CreatedAt\" DATETIME2 NULL");
        assert_eq!(lines[4], ")");
    }
}
