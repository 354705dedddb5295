pub mod config;
pub mod core;
pub mod domain;
pub mod telegram;
pub mod utils;

pub use crate::config::CliConfig;
pub use crate::core::compositor::MediaCompositor;
pub use crate::core::donate::Wallets;
pub use crate::core::handlers::App;
pub use crate::core::jobs::JobStore;
pub use crate::telegram::api::Bot;
pub use crate::utils::error::{BotError, Result};
