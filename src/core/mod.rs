pub mod compositor;
pub mod donate;
pub mod handlers;
pub mod image;
pub mod jobs;
pub mod process;
pub mod runner;
pub mod video;

pub use crate::domain::model::{Job, Logo, MediaKind, Opacity};
pub use crate::domain::ports::Compositor;
pub use crate::utils::error::Result;
