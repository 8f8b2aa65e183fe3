use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tagflow_core::{
    AppDefinition, AppRegistry, CommandExecutor, CommandStatus, ImageEngine,
};

/// エンジン呼び出しを記録するだけのイメージエンジン
#[derive(Default)]
pub struct FakeEngine {
    pub calls: RefCell<Vec<String>>,
    /// 存在する `image:tag`
    pub images: RefCell<BTreeSet<String>>,
    pub fail_build: bool,
    /// 失敗させる操作（記録と同じ文字列）
    pub fail_on: RefCell<BTreeSet<String>>,
}

impl FakeEngine {
    pub fn with_images(images: &[&str]) -> Self {
        let engine = Self::default();
        engine
            .images
            .borrow_mut()
            .extend(images.iter().map(|s| s.to_string()));
        engine
    }

    pub fn fail_on(self, call: &str) -> Self {
        self.fail_on.borrow_mut().insert(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> anyhow::Result<()> {
        let failed = self.fail_on.borrow().contains(&call);
        self.calls.borrow_mut().push(call.clone());
        if failed {
            anyhow::bail!("fake failure: {}", call);
        }
        Ok(())
    }
}

impl ImageEngine for FakeEngine {
    async fn build(&self, app: &AppDefinition, tag: &str, no_cache: bool) -> anyhow::Result<()> {
        if self.fail_build {
            anyhow::bail!("build error");
        }
        self.record(format!("build {}:{} no_cache={}", app.image, tag, no_cache))?;
        self.images.borrow_mut().insert(app.reference(tag));
        Ok(())
    }

    async fn tag(&self, app: &AppDefinition, source: &str, target: &str) -> anyhow::Result<()> {
        self.record(format!("tag {} {}", app.reference(source), app.reference(target)))?;
        self.images.borrow_mut().insert(app.reference(target));
        Ok(())
    }

    async fn push(&self, image: &str, tag: &str) -> anyhow::Result<()> {
        self.record(format!("push {}:{}", image, tag))
    }

    async fn pull(&self, image: &str, tag: &str) -> anyhow::Result<()> {
        self.record(format!("pull {}:{}", image, tag))
    }

    async fn remove(&self, reference: &str) -> anyhow::Result<()> {
        self.record(format!("remove {}", reference))?;
        self.images.borrow_mut().remove(reference);
        Ok(())
    }

    async fn list_existing_tags(&self, app: &AppDefinition) -> anyhow::Result<BTreeSet<String>> {
        let prefix = format!("{}:", app.image);
        Ok(self
            .images
            .borrow()
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, app: &AppDefinition, tag: &str) -> anyhow::Result<bool> {
        Ok(self.images.borrow().contains(&app.reference(tag)))
    }
}

/// 実行したコマンドを記録し、`fail` で始まるコマンドを失敗させる
#[derive(Default)]
pub struct FakeExecutor {
    pub commands: RefCell<Vec<String>>,
}

impl FakeExecutor {
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandExecutor for FakeExecutor {
    fn execute(&self, command: &str) -> anyhow::Result<CommandStatus> {
        self.commands.borrow_mut().push(command.to_string());
        if command.starts_with("fail") {
            Ok(CommandStatus::Failed(Some(1)))
        } else {
            Ok(CommandStatus::Success)
        }
    }
}

pub fn app(name: &str, image: &str) -> AppDefinition {
    AppDefinition::new(name, image)
}

pub fn registry(apps: Vec<AppDefinition>) -> AppRegistry {
    AppRegistry::new(apps, PathBuf::from("."))
}
