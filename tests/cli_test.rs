/// CLIのテスト
///
/// 引数の解析と、接続を必要としないコマンドの実行を確認します。
#[cfg(test)]
mod cli_tests {
    use clap::Parser;
    use schemabridge::cli::commands::generate_ddl::{GenerateDdlCommand, GenerateDdlCommandHandler};
    use schemabridge::cli::commands::insert::{InsertCommand, InsertCommandHandler};
    use schemabridge::cli::{Cli, Commands};
    use schemabridge::core::config::Dialect;
    use schemabridge::services::step::StepOutcome;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    const USERS_SCHEMA: &str = r#"
name: Users
properties:
  - name: Id
    type:
      kind: integer
    multiplicity: exactly_one
  - name: Email
    type:
      kind: string
    multiplicity: up_to_one
  - name: Role
    type:
      kind: enum
      name: Role
      values: [Admin, Member]
    multiplicity: up_to_one
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "schemabridge",
            "--config",
            "custom.yaml",
            "--no-color",
            "introspect",
            "--connection",
            "warehouse",
            "--table",
            "Orders",
            "--db-schema",
            "sales",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(cli.no_color);
        match cli.command {
            Commands::Introspect {
                connection,
                table,
                db_schema,
            } => {
                assert_eq!(connection, "warehouse");
                assert_eq!(table, "Orders");
                assert_eq!(db_schema.as_deref(), Some("sales"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["schemabridge", "migrate"]).is_err());
    }

    #[test]
    fn test_generate_ddl_for_every_dialect() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(&dir, "users.yaml", USERS_SCHEMA);
        let handler = GenerateDdlCommandHandler::new();

        for dialect in Dialect::ALL {
            let command = GenerateDdlCommand {
                dialect,
                schema_path: schema_path.clone(),
            };
            match handler.execute(&command).unwrap() {
                StepOutcome::Success(sql) => {
                    assert!(sql.starts_with("CREATE TABLE"), "{}: {}", dialect, sql);
                    assert!(sql.contains("Role"));
                }
                other => panic!("{}: unexpected outcome {:?}", dialect, other),
            }
        }
    }

    #[test]
    fn test_generate_ddl_missing_schema_file() {
        let command = GenerateDdlCommand {
            dialect: Dialect::SQLite,
            schema_path: PathBuf::from("/nonexistent/users.yaml"),
        };
        let err = GenerateDdlCommandHandler::new().execute(&command).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read schema file"));
    }

    #[tokio::test]
    async fn test_insert_command_on_sqlite() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("users.db");
        let config_path = write(
            &dir,
            "schemabridge.yaml",
            &format!(
                "version: \"1.0\"\nconnections:\n  local:\n    dialect: sqlite\n    url: \"sqlite://{}?mode=rwc\"\n",
                db_path.display()
            ),
        );
        let schema_path = write(&dir, "users.yaml", USERS_SCHEMA);
        let records_path = write(
            &dir,
            "users.json",
            r#"[{"Id": 1, "Email": "a@example.com", "Role": "Admin"}, {"Id": 2, "Role": "Member"}]"#,
        );

        let create = schemabridge::cli::commands::create_table::CreateTableCommand {
            config_path: Some(config_path.clone()),
            connection: "local".to_string(),
            schema_path: schema_path.clone(),
        };
        let created = schemabridge::cli::commands::create_table::CreateTableCommandHandler::new()
            .execute(&create)
            .await
            .unwrap();
        assert!(created.is_success());

        let command = InsertCommand {
            config_path: Some(config_path),
            connection: "local".to_string(),
            schema_path,
            records_path,
            db_schema: None,
        };
        let outcome = InsertCommandHandler::new()
            .execute(&command, &CancellationToken::new())
            .await
            .unwrap();

        match outcome {
            StepOutcome::Success(message) => assert!(message.contains("Inserted 2 of 2 records")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
