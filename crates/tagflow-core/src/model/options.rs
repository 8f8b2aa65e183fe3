//! 実行オプション

/// CLIから渡される実行オプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// ユーザー指定の追加タグ
    pub tag: Option<String>,
    pub force: bool,
    pub long_sha: bool,
    pub all_branches: bool,
    pub branch_tags: bool,
    pub commit_tags: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tag: None,
            force: false,
            long_sha: false,
            all_branches: false,
            branch_tags: true,
            commit_tags: true,
        }
    }
}

impl RunOptions {
    /// 空文字は未指定として扱う
    pub fn user_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }
}
