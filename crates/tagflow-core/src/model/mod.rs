//! モデル定義
//!
//! tagflowで使用されるデータモデルを定義します。

mod app;
mod options;
mod repo;

// Re-exports
pub use app::*;
pub use options::*;
pub use repo::*;
