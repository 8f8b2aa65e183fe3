use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
pub fn tagflow(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("tagflow").unwrap();
    cmd.current_dir(dir)
        .env_remove("TAGFLOW_CONFIG")
        .env_remove("TAGFLOW_NAMESPACE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) {
        self.write("tagflow.yml", content);
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// コミットのないGitリポジトリにする
    #[allow(dead_code)]
    pub fn init_empty_git(&self) {
        git2::Repository::init(self.root.path()).unwrap();
    }

    /// 初期コミット済みのGitリポジトリにする
    #[allow(dead_code)]
    pub fn init_git(&self) {
        let repo = git2::Repository::init(self.root.path()).unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("tagflow", "tagflow@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }
}
