//! リポジトリ状態のスナップショット

/// 短縮リビジョンの長さ
pub const SHORT_REVISION_LEN: usize = 7;

/// 1回の実行の間に固定されるリポジトリの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    /// 完全なコミットハッシュ
    pub revision: String,
    /// 先頭7文字
    pub short_revision: String,
    pub dirty: bool,
    /// ブランチ名（タグとして使える形に正規化済み）
    pub branches: Vec<String>,
    /// HEADを指しているタグ（正規化済み）
    pub tags: Vec<String>,
}

impl RepositoryState {
    pub fn new(revision: impl Into<String>, dirty: bool, branches: Vec<String>) -> Self {
        let revision = revision.into();
        let short_revision = revision.chars().take(SHORT_REVISION_LEN).collect();
        Self {
            revision,
            short_revision,
            dirty,
            branches,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// `long_sha` に応じたリビジョン文字列
    pub fn revision_tag(&self, long_sha: bool) -> &str {
        if long_sha {
            &self.revision
        } else {
            &self.short_revision
        }
    }

    /// ブランチタグとして使うラベル
    ///
    /// ブランチ、HEADのタグの順。重複は先に現れたものを残す。
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.branches.len() + self.tags.len());
        for label in self.branches.iter().chain(self.tags.iter()) {
            let label = sanitize_label(label);
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

/// ブランチ名・タグ名をイメージタグとして使える形に変換
///
/// - `heads/origin/`, `remotes/origin/` プレフィックスを除去
/// - `/` と `~` を `.` に置換
pub fn sanitize_label(label: &str) -> String {
    let label = label.trim().trim_start_matches(['*', ' ']);
    let label = label
        .strip_prefix("heads/origin/")
        .or_else(|| label.strip_prefix("remotes/origin/"))
        .unwrap_or(label);
    label.replace(['/', '~'], ".")
}
