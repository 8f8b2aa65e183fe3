//! フックコマンドの実行
//!
//! pre/post/test に書かれたコマンドをシェル経由で実行します。

use crate::engine::{CommandExecutor, CommandStatus};
use anyhow::Context;
use std::process::Command;

/// シェルでコマンドを実行する
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command: &str) -> anyhow::Result<CommandStatus> {
        tracing::debug!("Executing `{} -c {}`", self.shell, command);

        // 出力はそのまま端末に流す
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .status()
            .with_context(|| format!("{} の起動に失敗しました", self.shell))?;

        if status.success() {
            Ok(CommandStatus::Success)
        } else {
            Ok(CommandStatus::Failed(status.code()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_success() {
        let executor = ShellExecutor::default();
        let status = executor.execute("echo running pre").unwrap();
        assert_eq!(status, CommandStatus::Success);
    }

    #[test]
    fn test_execute_nonexistent_command() {
        let executor = ShellExecutor::default();
        let status = executor.execute("nonexistingPreCommand").unwrap();
        assert_eq!(status, CommandStatus::Failed(Some(127)));
    }

    #[test]
    fn test_execute_exit_code() {
        let executor = ShellExecutor::new("sh");
        let status = executor.execute("exit 3").unwrap();
        assert!(!status.success());
        assert_eq!(status, CommandStatus::Failed(Some(3)));
    }

    #[test]
    fn test_missing_shell_is_error() {
        let executor = ShellExecutor::new("/nonexistent/shell");
        assert!(executor.execute("true").is_err());
    }
}
