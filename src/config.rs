//! Configuration loading.
//!
//! Settings are resolved from three inputs, in this order: the command line,
//! the process environment, and an optional dotenv file whose entries win over
//! the process environment. The process environment itself is never modified;
//! everything is captured into an [`Environment`] value and passed explicitly.

use std::{collections::HashMap, io, path::Path, time::Duration};

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    cli::Cli,
    protector::{BranchRule, SuccessCheck},
    repository::Repository,
};

/// Variable holding the personal access token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "develop"];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{TOKEN_ENV_VAR} is not set")]
    MissingCredential,
    #[error("invalid API URL '{0}': {1}")]
    InvalidApiUrl(String, String),
    #[error("invalid repository '{0}'")]
    InvalidRepository(String),
    #[error("invalid branch name '{0}'")]
    InvalidBranch(String),
    #[error("timeout must be at least one second")]
    InvalidTimeout,
}

/// Snapshot of environment variables, optionally overlaid with a dotenv file.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Captures the process environment and overlays `dotenv_path` on top.
    ///
    /// A missing dotenv file is normal; an unreadable one is reported and
    /// skipped, as is each malformed line.
    pub fn capture(dotenv_path: &Path) -> Self {
        let mut env = Self::from_process();
        match env.overlay_dotenv(dotenv_path) {
            Ok(0) => debug!("No entries loaded from {}", dotenv_path.display()),
            Ok(count) => info!("Loaded {} entries from {}", count, dotenv_path.display()),
            Err(e) => warn!("Ignoring {}: {}", dotenv_path.display(), e),
        }
        env
    }

    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Reads `KEY=VALUE` lines from a dotenv file into this snapshot.
    ///
    /// Returns how many entries were applied. A file that does not exist
    /// applies nothing and is not an error. A line that fails to parse is
    /// logged and skipped; the lines around it still apply. A read error
    /// stops the overlay with the entries applied so far kept.
    // Parses without exporting into the process environment.
    #[allow(deprecated)]
    pub fn overlay_dotenv(&mut self, path: &Path) -> Result<usize, dotenv::Error> {
        let iter = match dotenv::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut count = 0;
        for entry in iter {
            match entry {
                Ok((key, value)) => {
                    self.vars.insert(key, value);
                    count += 1;
                }
                Err(dotenv::Error::Io(e)) => return Err(dotenv::Error::Io(e)),
                Err(e) => warn!("Skipping line in {}: {}", path.display(), e),
            }
        }
        Ok(count)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Personal access token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credential: Credential,
    pub repository: Repository,
    pub api_url: Url,
    pub plan: Vec<BranchRule>,
    pub success_check: SuccessCheck,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, env: &Environment) -> Result<Self, ConfigError> {
        let credential = env
            .get(TOKEN_ENV_VAR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Credential(token.to_string()))
            .ok_or(ConfigError::MissingCredential)?;

        let repository = Repository::new(cli.owner.trim(), cli.repo.trim());
        if Repository::parse(&repository.full_name()).as_ref() != Some(&repository) {
            return Err(ConfigError::InvalidRepository(repository.full_name()));
        }

        let api_url = Url::parse(&cli.api_url)
            .map_err(|e| ConfigError::InvalidApiUrl(cli.api_url.clone(), e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl(
                cli.api_url.clone(),
                "scheme must be http or https".to_string(),
            ));
        }
        // Request paths are resolved against the host root.
        if api_url.path() != "/" {
            return Err(ConfigError::InvalidApiUrl(
                cli.api_url.clone(),
                "must not contain a path".to_string(),
            ));
        }

        if cli.timeout == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(Settings {
            credential,
            repository,
            api_url,
            plan: branch_plan(&cli.branches, cli.strict)?,
            success_check: cli.success_check,
            timeout: Duration::from_secs(cli.timeout),
            dry_run: cli.dry_run,
        })
    }
}

/// Orders the branches to protect. The first branch is always fatal on
/// failure; the others are fatal only in strict mode.
pub fn branch_plan(branches: &[String], strict: bool) -> Result<Vec<BranchRule>, ConfigError> {
    let names: Vec<&str> = if branches.is_empty() {
        DEFAULT_BRANCHES.to_vec()
    } else {
        branches.iter().map(|b| b.trim()).collect()
    };

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidBranch(name.to_string()));
            }
            Ok(BranchRule::new(name, strict || i == 0))
        })
        .collect()
}
