//! tagflow core
//!
//! リポジトリの状態からイメージのタグを決定するロジックを提供します。
//!
//! - **tags**: push/pull するタグ一覧（TagPlan）の決定
//! - **planner**: ビルドの要否とタグ付け操作の決定
//! - **purge**: 削除してよいタグの選別
//! - **orchestrator**: フック・ビルド・タグ付けを順番に実行
//!
//! Git・イメージエンジン・シェルへのアクセスはトレイト越しに行い、
//! 実装は `tagflow-git` / `tagflow-build` が提供します。

pub mod engine;
pub mod error;
pub mod hooks;
pub mod model;
pub mod orchestrator;
pub mod planner;
pub mod purge;
pub mod report;
pub mod repository;
pub mod tags;

pub use engine::*;
pub use error::*;
pub use hooks::ShellExecutor;
pub use model::*;
pub use orchestrator::*;
pub use planner::*;
pub use purge::*;
pub use report::Reporter;
pub use repository::*;
pub use tags::*;
