use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Layered configuration: built-in defaults, then `board.toml`, then
// `BOARD_*` environment variables (e.g. BOARD_SCOPE=per-user).

pub const CONFIG_FILE: &str = "board.toml";
pub const ENV_PREFIX: &str = "BOARD_";
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Which pagination-state record a request reads and mutates.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeMode {
    /// One record shared by every caller.
    #[default]
    Global,
    /// One record per authenticated identity.
    PerUser,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub cors_origin: String,
    /// Where form posts land once handled.
    pub redirect_to: String,
    pub scope: ScopeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "comment-board.db".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cors_origin: "http://localhost:1313".to_string(),
            redirect_to: "/contact.html".to_string(),
            scope: ScopeMode::Global,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config = Config::load()?;
            assert_eq!(config.database_url, "comment-board.db");
            assert_eq!(config.redirect_to, "/contact.html");
            assert_eq!(config.scope, ScopeMode::Global);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    redirect_to = "/thanks.html"
                    scope = "global"
                "#,
            )?;
            jail.set_env("BOARD_SCOPE", "per-user");
            jail.set_env("BOARD_BIND_ADDR", "127.0.0.1:9000");

            let config = Config::load()?;
            assert_eq!(config.redirect_to, "/thanks.html");
            assert_eq!(config.scope, ScopeMode::PerUser);
            assert_eq!(config.bind_addr, "127.0.0.1:9000");
            Ok(())
        });
    }

    #[test]
    fn unknown_scope_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("BOARD_SCOPE", "per-galaxy");
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
