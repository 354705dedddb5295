use crate::core::donate::Wallets;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// Runtime configuration. Secrets and deploy-specific values come from the
/// environment; everything has a flag for local runs.
#[derive(Clone, Parser)]
#[command(name = "logostamp")]
#[command(about = "Telegram bot that stamps logo watermarks onto images and videos")]
pub struct CliConfig {
    /// BotFather token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Telegram Bot API base URL; tests point this at a mock server.
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = "https://api.telegram.org")]
    pub api_base: String,

    /// USDT (Solana) donation address.
    #[arg(long, env = "USDT_SOL_ADDR")]
    pub usdt_sol_addr: Option<String>,

    /// SOL donation address.
    #[arg(long, env = "SOL_ADDR")]
    pub sol_addr: Option<String>,

    /// Directory holding the logo overlay PNGs.
    #[arg(long, default_value = "./assets")]
    pub assets_dir: String,

    /// Working directory for per-job temp files; defaults to the system temp dir.
    #[arg(long)]
    pub tmp_dir: Option<String>,

    #[arg(long, default_value = "30")]
    pub poll_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn wallets(&self) -> Wallets {
        Wallets::new(self.usdt_sol_addr.clone(), self.sol_addr.clone())
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

// Manual Debug keeps the token out of logs.
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("usdt_sol_addr", &self.usdt_sol_addr)
            .field("sol_addr", &self.sol_addr)
            .field("assets_dir", &self.assets_dir)
            .field("tmp_dir", &self.tmp_dir)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("bot_token", &self.bot_token)?;
        validate_url("api_base", &self.api_base)?;
        validate_path("assets_dir", &self.assets_dir)?;
        if let Some(dir) = &self.tmp_dir {
            validate_path("tmp_dir", dir)?;
        }
        validate_range("poll_timeout_secs", self.poll_timeout_secs, 0, 60)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            bot_token: "123:abc".to_string(),
            api_base: "https://api.telegram.org".to_string(),
            usdt_sol_addr: None,
            sol_addr: None,
            assets_dir: "./assets".to_string(),
            tmp_dir: None,
            poll_timeout_secs: 30,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_blank_token_rejected() {
        let mut config = base_config();
        config.bot_token = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_api_base_rejected() {
        let mut config = base_config();
        config.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_timeout_bounded() {
        let mut config = base_config();
        config.poll_timeout_secs = 600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", base_config());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn test_tmp_dir_defaults_to_system_temp() {
        assert_eq!(base_config().tmp_dir(), std::env::temp_dir());
    }
}
