// ステップ結果
//
// ワークフローの結果報告チャネルに渡す統一的な結果表現。
// 成功・利用者の入力に起因するエラー・予期しない失敗を区別します。

use crate::core::error::EngineError;

/// ステップの実行結果
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    /// 成功
    Success(T),
    /// 入力の検証エラー（名前・型・スキーマ制約・レコード値）
    UserError(String),
    /// 接続・実行の失敗、またはキャンセル
    Failure(String),
}

impl<T> StepOutcome<T> {
    /// 成功かどうか
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    /// プロセスの終了コード（0: 成功, 1: 入力エラー, 2: 失敗）
    pub fn exit_code(&self) -> i32 {
        match self {
            StepOutcome::Success(_) => 0,
            StepOutcome::UserError(_) => 1,
            StepOutcome::Failure(_) => 2,
        }
    }

    /// 成功値を変換
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StepOutcome<U> {
        match self {
            StepOutcome::Success(value) => StepOutcome::Success(f(value)),
            StepOutcome::UserError(message) => StepOutcome::UserError(message),
            StepOutcome::Failure(message) => StepOutcome::Failure(message),
        }
    }
}

impl<T> From<Result<T, EngineError>> for StepOutcome<T> {
    fn from(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => StepOutcome::Success(value),
            Err(e) if e.is_user_error() => StepOutcome::UserError(e.to_string()),
            Err(e) => StepOutcome::Failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dialect;
    use crate::core::error::{ErrorList, ExecutionError, SchemaConstraintError};

    #[test]
    fn test_outcome_from_result() {
        let ok: StepOutcome<u64> = Ok(3).into();
        assert_eq!(ok, StepOutcome::Success(3));
        assert_eq!(ok.exit_code(), 0);

        let user: StepOutcome<u64> = Err(EngineError::from(SchemaConstraintError::NoProperties {
            schema: "T".to_string(),
        }))
        .into();
        assert_eq!(user.exit_code(), 1);

        let failure: StepOutcome<u64> =
            Err(EngineError::from(ExecutionError::new(Dialect::MsSql, "timeout"))).into();
        assert_eq!(failure.exit_code(), 2);
    }

    #[test]
    fn test_mixed_error_list_is_failure() {
        let mut errors = ErrorList::new();
        errors.push(SchemaConstraintError::NoProperties {
            schema: "T".to_string(),
        });
        errors.push(ExecutionError::new(Dialect::MySql, "gone away"));

        let outcome: StepOutcome<()> = Err(EngineError::Multiple(errors)).into();
        assert!(matches!(outcome, StepOutcome::Failure(ref m) if m.lines().count() == 2));
    }

    #[test]
    fn test_cancelled_is_failure() {
        let outcome: StepOutcome<()> = Err(EngineError::Cancelled { batch: 4 }).into();
        assert_eq!(outcome.exit_code(), 2);
        assert!(!outcome.is_success());
        assert_eq!(outcome.map(|_| 1), StepOutcome::Failure("Operation cancelled before batch 4".to_string()));
    }
}
