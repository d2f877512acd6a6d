/// サーバー型データベースの統合テスト
///
/// testcontainersでPostgreSQL / MySQL / MariaDB / SQL Serverを起動し、テーブル作成・
/// イントロスペクション・一括挿入を通しで実行します。
///
/// 注意: このテストはDockerが必要です。`cargo test -- --ignored` で実行します。
#[cfg(test)]
mod container_roundtrip_tests {
    use schemabridge::adapters::database::{DriverRegistry, SqlCommand};
    use schemabridge::core::config::{ConnectionConfig, Dialect};
    use schemabridge::core::record::{Record, Value};
    use schemabridge::core::schema::{Multiplicity, PortableType, Schema};
    use schemabridge::services::table_service::TableService;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::ImageExt;
    use testcontainers_modules::mariadb::Mariadb;
    use testcontainers_modules::mssql_server::MssqlServer;
    use testcontainers_modules::mysql::Mysql;
    use testcontainers_modules::postgres::Postgres;
    use tokio_util::sync::CancellationToken;

    fn people() -> Schema {
        Schema::new("People")
            .with_property("Id", PortableType::Integer, Multiplicity::ExactlyOne)
            .and_then(|s| s.with_property("Name", PortableType::String, Multiplicity::UpToOne))
            .and_then(|s| s.with_property("Score", PortableType::Double, Multiplicity::UpToOne))
            .and_then(|s| s.with_property("Active", PortableType::Bool, Multiplicity::UpToOne))
            .unwrap()
    }

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                let name = if i % 10 == 0 {
                    Value::Null
                } else {
                    Value::String(format!("person {}", i))
                };
                Record::new()
                    .with_field("Id", Value::Integer(i as i64))
                    .with_field("Name", name)
                    .with_field("Score", Value::Double(i as f64 / 4.0))
                    .with_field("Active", Value::Bool(i % 3 == 0))
            })
            .collect()
    }

    async fn roundtrip(connection: ConnectionConfig, qualifier: Option<&str>, count_sql: &str) {
        let service = TableService::with_default_drivers();
        let schema = people();

        service.create_table(&connection, &schema).await.unwrap();

        let recovered = service
            .introspect_table(&connection, "People", qualifier)
            .await
            .unwrap();
        assert_eq!(recovered.properties, schema.properties);

        // 4カラム -> 1バッチ524件
        let inserted = service
            .insert_records(&connection, &schema, records(1200), qualifier, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(inserted, 1200);

        let mut conn = DriverRegistry::with_default_drivers()
            .open(connection.dialect, &connection.url)
            .await
            .unwrap();
        let count = conn.execute_scalar(&SqlCommand::new(count_sql)).await.unwrap();
        conn.close().await.unwrap();
        assert_eq!(count, Some(Value::Integer(1200)));
    }

    #[tokio::test]
    #[ignore] // Docker必須のため、通常のテスト実行ではスキップ
    async fn test_postgres_roundtrip() {
        let container = Postgres::default().with_tag("16-alpine").start().await.unwrap();
        let host = container.get_host().await.unwrap();
        let port = container.get_host_port_ipv4(5432).await.unwrap();
        let connection = ConnectionConfig::new(
            Dialect::Postgres,
            format!("postgres://postgres:postgres@{}:{}/postgres", host, port),
        );

        roundtrip(
            connection,
            Some("public"),
            "SELECT COUNT(*) FROM \"public\".\"People\"",
        )
        .await;
    }

    #[tokio::test]
    #[ignore] // Docker必須のため、通常のテスト実行ではスキップ
    async fn test_mysql_roundtrip() {
        let container = Mysql::default().start().await.unwrap();
        let host = container.get_host().await.unwrap();
        let port = container.get_host_port_ipv4(3306).await.unwrap();
        let connection = ConnectionConfig::new(
            Dialect::MySql,
            format!("mysql://root@{}:{}/test", host, port),
        );

        roundtrip(connection, None, "SELECT COUNT(*) FROM People").await;
    }

    #[tokio::test]
    #[ignore] // Docker必須のため、通常のテスト実行ではスキップ
    async fn test_mariadb_roundtrip() {
        let container = Mariadb::default().start().await.unwrap();
        let host = container.get_host().await.unwrap();
        let port = container.get_host_port_ipv4(3306).await.unwrap();
        let connection = ConnectionConfig::new(
            Dialect::MariaDb,
            format!("mysql://root@{}:{}/test", host, port),
        );

        roundtrip(connection, None, "SELECT COUNT(*) FROM People").await;
    }

    #[tokio::test]
    #[ignore] // Docker必須のため、通常のテスト実行ではスキップ
    async fn test_mssql_roundtrip() {
        let container = MssqlServer::default()
            .with_accept_eula()
            .start()
            .await
            .unwrap();
        let host = container.get_host().await.unwrap();
        let port = container.get_host_port_ipv4(1433).await.unwrap();
        let connection = ConnectionConfig::new(
            Dialect::MsSql,
            format!(
                "Server=tcp:{},{};User Id=sa;Password={};TrustServerCertificate=True;",
                host,
                port,
                MssqlServer::DEFAULT_SA_PASSWORD
            ),
        );

        // 4カラム -> 1バッチ524件（@P1 .. @P2096）
        roundtrip(connection, None, "SELECT COUNT(*) FROM \"People\"").await;
    }
}
