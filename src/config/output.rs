use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where crawl results land on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root for every path below.
    /// TOML: `output.data_dir`. Default: `.`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-region city tables (`<states_dir>/<Region>.csv`).
    /// TOML: `output.states_dir`. Default: `states`.
    #[serde(default = "default_states_dir")]
    pub states_dir: PathBuf,

    /// Search summaries. TOML: `output.accounts_dir`. Default: `accounts`.
    #[serde(default = "default_accounts_dir")]
    pub accounts_dir: PathBuf,

    /// Enriched rows. TOML: `output.users_dir`. Default: `users`.
    #[serde(default = "default_users_dir")]
    pub users_dir: PathBuf,

    /// Search-phase ledger. TOML: `output.accounts_ledger`. Default: `account_count.csv`.
    #[serde(default = "default_accounts_ledger")]
    pub accounts_ledger: PathBuf,

    /// Enrichment-phase ledger. TOML: `output.users_ledger`. Default: `user_count.csv`.
    #[serde(default = "default_users_ledger")]
    pub users_ledger: PathBuf,

    /// Emit follower/following/public-repo columns.
    /// TOML: `output.include_counts`. Default: `true`.
    #[serde(default = "default_include_counts")]
    pub include_counts: bool,
}

impl OutputConfig {
    pub fn states_path(&self) -> PathBuf {
        self.data_dir.join(&self.states_dir)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join(&self.accounts_dir)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_dir)
    }

    pub fn accounts_ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.accounts_ledger)
    }

    pub fn users_ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_ledger)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            states_dir: default_states_dir(),
            accounts_dir: default_accounts_dir(),
            users_dir: default_users_dir(),
            accounts_ledger: default_accounts_ledger(),
            users_ledger: default_users_ledger(),
            include_counts: default_include_counts(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_states_dir() -> PathBuf {
    PathBuf::from("states")
}

fn default_accounts_dir() -> PathBuf {
    PathBuf::from("accounts")
}

fn default_users_dir() -> PathBuf {
    PathBuf::from("users")
}

fn default_accounts_ledger() -> PathBuf {
    PathBuf::from("account_count.csv")
}

fn default_users_ledger() -> PathBuf {
    PathBuf::from("user_count.csv")
}

fn default_include_counts() -> bool {
    true
}
