//! Gitリポジトリの状態取得
//!
//! libgit2 経由で HEAD のリビジョン、ブランチ、タグ、作業ツリーの状態を読み取ります。

use anyhow::Context;
use git2::{BranchType, ErrorCode, Oid, Repository, StatusOptions};
use std::path::Path;
use tagflow_core::{RepositoryStateProvider, SHORT_REVISION_LEN};

/// 作業ディレクトリのGitリポジトリ
///
/// リポジトリ外で作成した場合や、まだコミットがない場合は
/// `is_repository()` が `false` になる。
pub struct GitRepository {
    repo: Option<Repository>,
}

impl GitRepository {
    /// `path` から親方向にリポジトリを探す
    pub fn discover(path: &Path) -> Self {
        match Repository::discover(path) {
            Ok(repo) => {
                tracing::debug!("Found git repository at {}", repo.path().display());
                Self { repo: Some(repo) }
            }
            Err(e) => {
                tracing::debug!("No git repository at {}: {}", path.display(), e);
                Self { repo: None }
            }
        }
    }

    /// カレントディレクトリから探す
    pub fn discover_current() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("カレントディレクトリを取得できません")?;
        Ok(Self::discover(&cwd))
    }

    fn repo(&self) -> anyhow::Result<&Repository> {
        self.repo
            .as_ref()
            .context("Gitリポジトリが見つかりません")
    }

    fn head_oid(&self) -> anyhow::Result<Oid> {
        let commit = self
            .repo()?
            .head()
            .context("HEADを解決できません（コミットがない可能性があります）")?
            .peel_to_commit()?;
        Ok(commit.id())
    }
}

impl RepositoryStateProvider for GitRepository {
    fn is_repository(&self) -> bool {
        let Some(repo) = &self.repo else {
            return false;
        };
        match repo.head() {
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                tracing::debug!("Repository has no commits yet: {}", e);
                false
            }
            _ => true,
        }
    }

    fn revision(&self, long: bool) -> anyhow::Result<String> {
        let revision = self.head_oid()?.to_string();
        if long {
            Ok(revision)
        } else {
            Ok(revision.chars().take(SHORT_REVISION_LEN).collect())
        }
    }

    fn branches(&self, all: bool) -> anyhow::Result<Vec<String>> {
        let repo = self.repo()?;
        let head = repo.head().context("HEADを解決できません")?;

        // detached HEAD の場合は "HEAD"
        let current = if repo.head_detached()? {
            "HEAD".to_string()
        } else {
            head.shorthand().unwrap_or("HEAD").to_string()
        };

        let mut branches = vec![current];
        if !all {
            return Ok(branches);
        }

        let head_oid = head.peel_to_commit()?.id();
        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let points_at_head = branch
                .get()
                .peel_to_commit()
                .map(|c| c.id() == head_oid)
                .unwrap_or(false);
            if !points_at_head {
                continue;
            }
            if let Some(name) = branch.name()? {
                if !branches.iter().any(|b| b == name) {
                    branches.push(name.to_string());
                }
            }
        }

        Ok(branches)
    }

    fn tags_at_head(&self) -> anyhow::Result<Vec<String>> {
        let repo = self.repo()?;
        let head_oid = self.head_oid()?;

        let mut tags = Vec::new();
        for name in repo.tag_names(None)?.iter().flatten() {
            let target = repo
                .revparse_single(&format!("refs/tags/{}", name))
                .and_then(|obj| obj.peel_to_commit());
            match target {
                Ok(commit) if commit.id() == head_oid => tags.push(name.to_string()),
                Ok(_) => {}
                // コミット以外を指すタグは無視
                Err(e) => tracing::debug!("Skipping tag {}: {}", name, e),
            }
        }

        Ok(tags)
    }

    fn is_dirty(&self) -> bool {
        let Some(repo) = self.repo.as_ref() else {
            return true;
        };

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        match repo.statuses(Some(&mut opts)) {
            Ok(statuses) => !statuses.is_empty(),
            Err(e) => {
                tracing::warn!("Failed to read git status: {}", e);
                true
            }
        }
    }
}
