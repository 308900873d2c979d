//! Build identification, surfaced by the CLI `version` command.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: option_env!("REPO_VERSION").unwrap_or("unknown").to_string(),
            build_profile: option_env!("BUILD_PROFILE")
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    pub fn short_hash(&self) -> &str {
        if self.git_hash.len() > 7 {
            &self.git_hash[..7]
        } else {
            &self.git_hash
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.short_hash())
    }
}

pub fn version() -> String {
    BuildInfo::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_carries_package_version() {
        assert!(version().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn short_hash_truncates() {
        let mut info = BuildInfo::new();
        info.git_hash = "abcdef123456789".to_string();
        assert_eq!(info.short_hash(), "abcdef1");
    }
}
