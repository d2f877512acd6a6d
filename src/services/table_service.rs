// テーブルサービス
//
// ワークフローステップから呼ばれる公開操作（テーブル作成・イントロスペクション・一括挿入）。
// 各操作は接続を1つだけ開き、成功・失敗のどちらの経路でも戻る前に閉じます。

use crate::adapters::database::{DbConnection, DriverRegistry, SqlCommand};
use crate::adapters::database_introspector::DatabaseIntrospector;
use crate::adapters::sql_generator::insert::{InsertBatchBuilder, InsertBatches};
use crate::adapters::sql_generator::CreateTableGenerator;
use crate::core::config::ConnectionConfig;
use crate::core::error::{ConnectionError, EngineError, ErrorList};
use crate::core::record::Record;
use crate::core::schema::Schema;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// テーブルサービス
#[derive(Debug, Clone)]
pub struct TableService {
    registry: DriverRegistry,
}

impl TableService {
    /// 新しいTableServiceを作成
    pub fn new(registry: DriverRegistry) -> Self {
        Self { registry }
    }

    /// 標準ドライバーを使うTableServiceを作成
    pub fn with_default_drivers() -> Self {
        Self::new(DriverRegistry::with_default_drivers())
    }

    /// スキーマからテーブルを作成
    ///
    /// DDLの検証エラーはすべて収集され、SQLは発行されません。
    ///
    /// # Returns
    ///
    /// ドライバーが報告した影響行数
    pub async fn create_table(
        &self,
        connection: &ConnectionConfig,
        schema: &Schema,
    ) -> Result<u64, EngineError> {
        let sql = CreateTableGenerator::new(connection.dialect)
            .build_create_table(schema)
            .map_err(ErrorList::into_engine_error)?;

        let mut conn = self.open(connection).await?;
        let result = conn
            .execute_non_query(&SqlCommand::new(sql))
            .await
            .map_err(EngineError::from);
        let affected = finish(conn, result).await?;

        info!(dialect = %connection.dialect, table = %schema.name, "created table");
        Ok(affected)
    }

    /// 既存テーブルのスキーマを取得
    ///
    /// # Arguments
    ///
    /// * `connection` - 接続設定
    /// * `table` - テーブル名
    /// * `qualifier` - スキーマ修飾子（PostgreSQLのみ絞り込みに使用）
    pub async fn introspect_table(
        &self,
        connection: &ConnectionConfig,
        table: &str,
        qualifier: Option<&str>,
    ) -> Result<Schema, EngineError> {
        let introspector = DatabaseIntrospector::new(connection.dialect);
        // 接続前に名前を検証
        introspector.build_query(table, qualifier)?;

        let mut conn = self.open(connection).await?;
        let result = introspector.introspect(table, conn.as_mut(), qualifier).await;
        finish(conn, result).await
    }

    /// レコードを一括挿入
    ///
    /// バッチを順番に実行し、バッチの間でキャンセルを確認します。
    /// 失敗したバッチで中断し、それまでに挿入されたバッチはロールバックしません。
    ///
    /// # Returns
    ///
    /// バッチごとの影響行数の合計
    pub async fn insert_records<I>(
        &self,
        connection: &ConnectionConfig,
        schema: &Schema,
        records: I,
        qualifier: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<u64, EngineError>
    where
        I: IntoIterator<Item = Record>,
    {
        let builder = InsertBatchBuilder::new(schema, connection.dialect, qualifier)?;
        let batches = builder.into_batches(records);
        debug!(batch_size = batches.batch_size(), "inserting records");

        let mut conn = self.open(connection).await?;
        let result = execute_batches(conn.as_mut(), batches, cancel).await;
        let total = finish(conn, result).await?;

        info!(dialect = %connection.dialect, table = %schema.name, rows = total, "inserted records");
        Ok(total)
    }

    /// 接続を開く（タイムアウト設定があれば適用）
    async fn open(&self, connection: &ConnectionConfig) -> Result<Box<dyn DbConnection>, EngineError> {
        let open = self.registry.open(connection.dialect, &connection.url);
        let conn = match connection.timeout {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), open)
                .await
                .map_err(|_| ConnectionError {
                    dialect: connection.dialect,
                    message: format!("timed out after {} seconds", seconds),
                })??,
            None => open.await?,
        };
        Ok(conn)
    }
}

/// バッチを順番に実行
async fn execute_batches<I>(
    conn: &mut dyn DbConnection,
    batches: InsertBatches<I>,
    cancel: &CancellationToken,
) -> Result<u64, EngineError>
where
    I: Iterator<Item = Record>,
{
    let mut total = 0u64;
    let mut index = 0usize;

    for batch in batches {
        // 次のバッチが残っている場合だけ中断する
        if cancel.is_cancelled() {
            warn!(batch = index, rows = total, "insert cancelled");
            return Err(EngineError::Cancelled { batch: index });
        }

        let statement = batch.map_err(ErrorList::into_engine_error)?;

        let affected = conn.execute_non_query(&statement.command).await?;
        total += affected;
        debug!(
            batch = statement.batch_index,
            rows = statement.row_count,
            affected,
            "executed INSERT batch"
        );
        index += 1;
    }

    Ok(total)
}

/// 接続を閉じてから操作結果を返す
///
/// 閉じる際のエラーは警告として記録し、操作結果を優先します。
async fn finish<T>(
    conn: Box<dyn DbConnection>,
    result: Result<T, EngineError>,
) -> Result<T, EngineError> {
    let dialect = conn.dialect();
    if let Err(e) = conn.close().await {
        warn!(%dialect, error = %e, "failed to close connection");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::ConnectionFactory;
    use crate::core::config::Dialect;
    use crate::core::error::{ConnectionError, ExecutionError};
    use crate::core::record::Value;
    use crate::core::schema::{Multiplicity, PortableType};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// 実行されたSQLと close の呼び出しを記録する接続
    #[derive(Default)]
    struct Journal {
        statements: Vec<String>,
        opened: usize,
        closed: usize,
    }

    struct RecordingConnection {
        journal: Arc<Mutex<Journal>>,
        fail_on: Option<usize>,
        rows: Vec<Record>,
        cancel_during_execute: Option<CancellationToken>,
    }

    #[async_trait]
    impl DbConnection for RecordingConnection {
        fn dialect(&self) -> Dialect {
            Dialect::SQLite
        }

        async fn execute_non_query(&mut self, command: &SqlCommand) -> Result<u64, ExecutionError> {
            let mut journal = self.journal.lock().unwrap();
            journal.statements.push(command.text.clone());
            if Some(journal.statements.len()) == self.fail_on {
                return Err(ExecutionError::new(Dialect::SQLite, "disk I/O error"));
            }
            if let Some(token) = &self.cancel_during_execute {
                token.cancel();
            }
            Ok(command.parameters.len() as u64 / 2)
        }

        async fn execute_reader(&mut self, command: &SqlCommand) -> Result<Vec<Record>, ExecutionError> {
            self.journal.lock().unwrap().statements.push(command.text.clone());
            Ok(self.rows.clone())
        }

        async fn execute_scalar(
            &mut self,
            _command: &SqlCommand,
        ) -> Result<Option<Value>, ExecutionError> {
            Ok(None)
        }

        async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
            self.journal.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    struct RecordingFactory {
        journal: Arc<Mutex<Journal>>,
        fail_on: Option<usize>,
        rows: Vec<Record>,
        cancel_during_execute: Option<CancellationToken>,
    }

    #[async_trait]
    impl ConnectionFactory for RecordingFactory {
        async fn open(&self, _url: &str) -> Result<Box<dyn DbConnection>, ConnectionError> {
            self.journal.lock().unwrap().opened += 1;
            Ok(Box::new(RecordingConnection {
                journal: Arc::clone(&self.journal),
                fail_on: self.fail_on,
                rows: self.rows.clone(),
                cancel_during_execute: self.cancel_during_execute.clone(),
            }))
        }
    }

    fn service(fail_on: Option<usize>, rows: Vec<Record>) -> (TableService, Arc<Mutex<Journal>>) {
        recording_service(fail_on, rows, None)
    }

    fn recording_service(
        fail_on: Option<usize>,
        rows: Vec<Record>,
        cancel_during_execute: Option<CancellationToken>,
    ) -> (TableService, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let registry = DriverRegistry::new().with_factory(
            Dialect::SQLite,
            Arc::new(RecordingFactory {
                journal: Arc::clone(&journal),
                fail_on,
                rows,
                cancel_during_execute,
            }),
        );
        (TableService::new(registry), journal)
    }

    fn sqlite() -> ConnectionConfig {
        ConnectionConfig::new(Dialect::SQLite, "sqlite::memory:")
    }

    fn pairs() -> Schema {
        Schema::new("Pairs")
            .with_property("A", PortableType::Integer, Multiplicity::ExactlyOne)
            .and_then(|s| s.with_property("B", PortableType::Integer, Multiplicity::UpToOne))
            .unwrap()
    }

    fn pair(i: i64) -> Record {
        Record::new().with_field("A", Value::Integer(i))
    }

    #[tokio::test]
    async fn test_create_table_executes_generated_ddl() {
        let (service, journal) = service(None, Vec::new());
        service.create_table(&sqlite(), &pairs()).await.unwrap();

        let journal = journal.lock().unwrap();
        assert_eq!(journal.statements.len(), 1);
        assert!(journal.statements[0].starts_with("CREATE TABLE \"Pairs\""));
        assert_eq!((journal.opened, journal.closed), (1, 1));
    }

    #[tokio::test]
    async fn test_create_table_rejects_before_connecting() {
        let (service, journal) = service(None, Vec::new());
        let schema = pairs().with_extra_properties(crate::core::schema::ExtraPropertyBehavior::Allow);

        let err = service.create_table(&sqlite(), &schema).await.unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(journal.lock().unwrap().opened, 0);
    }

    #[tokio::test]
    async fn test_insert_accumulates_per_batch() {
        let (service, journal) = service(None, Vec::new());
        let records: Vec<Record> = (0..2500).map(pair).collect();

        let total = service
            .insert_records(&sqlite(), &pairs(), records, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(total, 2500);
        let journal = journal.lock().unwrap();
        // 2099 / 2 = 1049 件ずつ
        assert_eq!(journal.statements.len(), 3);
        assert_eq!(journal.closed, 1);
    }

    #[tokio::test]
    async fn test_insert_stops_at_failed_batch_and_closes() {
        let (service, journal) = service(Some(2), Vec::new());
        let records: Vec<Record> = (0..2500).map(pair).collect();

        let err = service
            .insert_records(&sqlite(), &pairs(), records, None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Execution(_)));
        let journal = journal.lock().unwrap();
        assert_eq!(journal.statements.len(), 2);
        assert_eq!(journal.closed, 1);
    }

    #[tokio::test]
    async fn test_insert_honours_cancellation() {
        let (service, journal) = service(None, Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service
            .insert_records(&sqlite(), &pairs(), vec![pair(1)], None, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        let journal = journal.lock().unwrap();
        assert!(journal.statements.is_empty());
        assert_eq!(journal.closed, 1);
    }

    #[tokio::test]
    async fn test_cancel_during_last_batch_keeps_result() {
        let cancel = CancellationToken::new();
        let (service, journal) = recording_service(None, Vec::new(), Some(cancel.clone()));

        let total = service
            .insert_records(&sqlite(), &pairs(), vec![pair(1), pair(2)], None, &cancel)
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert!(cancel.is_cancelled());
        assert_eq!(journal.lock().unwrap().statements.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_batch_stops_before_next() {
        let cancel = CancellationToken::new();
        let (service, journal) = recording_service(None, Vec::new(), Some(cancel.clone()));
        let records: Vec<Record> = (0..2500).map(pair).collect();

        let err = service
            .insert_records(&sqlite(), &pairs(), records, None, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Cancelled { batch: 1 });
        let journal = journal.lock().unwrap();
        assert_eq!(journal.statements.len(), 1);
        assert_eq!(journal.closed, 1);
    }

    #[tokio::test]
    async fn test_insert_record_errors_are_user_errors() {
        let (service, journal) = service(None, Vec::new());
        let bad = Record::new().with_field("B", Value::Integer(1));

        let err = service
            .insert_records(&sqlite(), &pairs(), vec![bad], None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Record(_)));
        assert!(journal.lock().unwrap().statements.is_empty());
    }

    #[tokio::test]
    async fn test_introspect_closes_connection_on_failure() {
        let (service, journal) = service(None, Vec::new());

        let err = service
            .introspect_table(&sqlite(), "Missing", None)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::IntrospectionParse(_)));
        let journal = journal.lock().unwrap();
        assert_eq!((journal.opened, journal.closed), (1, 1));
    }

    #[tokio::test]
    async fn test_introspect_invalid_name_never_connects() {
        let (service, journal) = service(None, Vec::new());
        let err = service
            .introspect_table(&sqlite(), "1table", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidName(_)));
        assert_eq!(journal.lock().unwrap().opened, 0);
    }

    #[tokio::test]
    async fn test_missing_driver_is_connection_error() {
        let service = TableService::new(DriverRegistry::new());
        let err = service.create_table(&sqlite(), &pairs()).await.unwrap_err();
        assert!(matches!(err, EngineError::Connection(_)));
        assert!(!err.is_user_error());
    }
}
