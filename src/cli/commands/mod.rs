// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod create_table;
pub mod generate_ddl;
pub mod insert;
pub mod introspect;

use crate::services::step::StepOutcome;
use colored::Colorize;

/// ステップ結果を表示用の文字列に整形
pub fn render_outcome(outcome: &StepOutcome<String>) -> String {
    match outcome {
        StepOutcome::Success(output) => output.clone(),
        StepOutcome::UserError(message) => {
            format!("{} {}", "Invalid input:".yellow().bold(), message)
        }
        StepOutcome::Failure(message) => format!("{} {}", "Failed:".red().bold(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_outcome() {
        colored::control::set_override(false);
        assert_eq!(render_outcome(&StepOutcome::Success("ok".to_string())), "ok");
        assert_eq!(
            render_outcome(&StepOutcome::UserError("bad name".to_string())),
            "Invalid input: bad name"
        );
        assert_eq!(
            render_outcome(&StepOutcome::Failure("refused".to_string())),
            "Failed: refused"
        );
    }
}
