use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::llm::LlmClient;
use crate::report::ReportGenerator;
use crate::research::search::EvidenceSource;
use crate::scrape::PageFetcher;
use crate::store::AuditStore;

/// Longest the archive button may stay live. Discord invalidates the
/// interaction token 15 minutes after the command, and the audit itself
/// spends part of that window.
pub const MAX_ARCHIVE_TIMEOUT_SECS: u64 = 600;

/// Runtime audit parameters (admins can modify at runtime).
pub struct AuditConfig {
    /// Cap on characters kept from each page and from the contract.
    pub max_page_chars: usize,
    /// How long the archive button stays live after a report is posted.
    pub archive_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_page_chars: 20_000,
            archive_timeout_secs: 300,
        }
    }
}

/// Parameters settable through `/audit config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ConfigParam {
    #[name = "max_page_chars"]
    MaxPageChars,
    #[name = "archive_timeout_secs"]
    ArchiveTimeoutSecs,
}

impl ConfigParam {
    pub const ALL: [ConfigParam; 2] = [ConfigParam::MaxPageChars, ConfigParam::ArchiveTimeoutSecs];

    pub fn key(self) -> &'static str {
        match self {
            ConfigParam::MaxPageChars => "max_page_chars",
            ConfigParam::ArchiveTimeoutSecs => "archive_timeout_secs",
        }
    }
}

impl AuditConfig {
    pub fn get(&self, param: ConfigParam) -> u64 {
        match param {
            ConfigParam::MaxPageChars => self.max_page_chars as u64,
            ConfigParam::ArchiveTimeoutSecs => self.archive_timeout_secs,
        }
    }

    /// Store `value` for `param`, clamped to the parameter's range, and
    /// return what was stored.
    pub fn set(&mut self, param: ConfigParam, value: u32) -> u64 {
        match param {
            ConfigParam::MaxPageChars => self.max_page_chars = value.max(1) as usize,
            ConfigParam::ArchiveTimeoutSecs => {
                self.archive_timeout_secs = u64::from(value).clamp(1, MAX_ARCHIVE_TIMEOUT_SECS)
            }
        }
        self.get(param)
    }

    pub fn describe(&self) -> String {
        let mut out = String::from("**Audit Configuration:**");
        for param in ConfigParam::ALL {
            out.push_str(&format!("\n`{}`: {}", param.key(), self.get(param)));
        }
        out
    }
}

pub struct AppState {
    pub store: Arc<AuditStore>,
    pub llm: Arc<LlmClient>,
    pub search: Arc<dyn EvidenceSource>,
    pub fetcher: Arc<PageFetcher>,
    pub reports: Arc<ReportGenerator>,
    pub admin_ids: HashSet<u64>,
    pub audit_config: Arc<RwLock<AuditConfig>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Anyone may audit when no admins are configured.
    pub fn can_audit(&self, user_id: u64) -> bool {
        self.admin_ids.is_empty() || self.is_admin(user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_timeout_is_clamped() {
        let mut config = AuditConfig::default();
        assert_eq!(config.set(ConfigParam::ArchiveTimeoutSecs, 3_600), MAX_ARCHIVE_TIMEOUT_SECS);
        assert_eq!(config.archive_timeout_secs, MAX_ARCHIVE_TIMEOUT_SECS);
        assert_eq!(config.set(ConfigParam::ArchiveTimeoutSecs, 0), 1);
        assert_eq!(config.set(ConfigParam::ArchiveTimeoutSecs, 120), 120);
    }

    #[test]
    fn test_max_page_chars_set_and_describe() {
        let mut config = AuditConfig::default();
        assert_eq!(config.set(ConfigParam::MaxPageChars, 30_000), 30_000);
        assert_eq!(config.max_page_chars, 30_000);
        assert_eq!(config.set(ConfigParam::MaxPageChars, 0), 1);
        assert_eq!(
            config.describe(),
            "**Audit Configuration:**\n`max_page_chars`: 1\n`archive_timeout_secs`: 300"
        );
    }
}
