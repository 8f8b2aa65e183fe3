//! tagflow Docker image engine
//!
//! This crate drives the local Docker daemon for tagflow:
//! build context creation, image building and tagging,
//! registry push/pull, and listing or removing local tags.

pub mod builder;
pub mod context;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod progress;
pub mod pusher;
pub mod resolver;

pub use builder::ImageBuilder;
pub use context::{ContextBuilder, DOCKERFILE_ENTRY};
pub use engine::DockerEngine;
pub use error::{BuildError, BuildResult};
pub use progress::BuildProgress;
pub use pusher::{ImagePusher, validate_tag};
pub use resolver::BuildResolver;
