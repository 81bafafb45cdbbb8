//! # Store Configuration
//!
//! Configuration for the cart store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BASKET_QUANTITY_POLICY=reject                                      │
//! │     BASKET_CHECKOUT_CONCURRENCY=supersede                              │
//! │     BASKET_CHECKOUT_TIMEOUT_MS=10000                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/basket/basket.toml (Linux)                               │
//! │     ~/Library/Application Support/com.basket.basket/basket.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     accept quantities as given, reject overlapping checkouts, 30s      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # basket.toml
//! [cart]
//! quantity_policy = "accept"  # accept | reject | remove
//!
//! [checkout]
//! concurrency = "reject"      # reject | supersede
//! timeout_ms = 30000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Quantity Policy
// =============================================================================

/// What `update_quantity` does with a quantity below 1.
///
/// ## Policy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  update_quantity("X", 0)                                                │
/// │                                                                         │
/// │  ACCEPT (Default)        REJECT                   REMOVE                │
/// │  ────────────────        ──────                   ──────                │
/// │  items["X"] = 0          Err(Validation)          delete items["X"]     │
/// │  stored as given         state unchanged          like remove_from_cart │
/// │                          also caps at 999                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Store the literal value, whatever it is.
    #[default]
    Accept,

    /// Validate the product id and quantity (1..=999) first.
    Reject,

    /// Quantities of zero or below delete the entry.
    Remove,
}

impl std::fmt::Display for QuantityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantityPolicy::Accept => write!(f, "accept"),
            QuantityPolicy::Reject => write!(f, "reject"),
            QuantityPolicy::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for QuantityPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" | "legacy" => Ok(QuantityPolicy::Accept),
            "reject" | "strict" => Ok(QuantityPolicy::Reject),
            "remove" => Ok(QuantityPolicy::Remove),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown quantity policy: '{}'. Valid options: accept, reject, remove",
                other
            ))),
        }
    }
}

// =============================================================================
// Checkout Concurrency
// =============================================================================

/// What happens when checkout is started while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutConcurrency {
    /// The second initiation fails with `CheckoutInProgress`; nothing changes.
    #[default]
    Reject,

    /// The in-flight checkout is aborted and the new one takes its place.
    Supersede,
}

impl std::fmt::Display for CheckoutConcurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutConcurrency::Reject => write!(f, "reject"),
            CheckoutConcurrency::Supersede => write!(f, "supersede"),
        }
    }
}

impl std::str::FromStr for CheckoutConcurrency {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(CheckoutConcurrency::Reject),
            "supersede" | "replace" => Ok(CheckoutConcurrency::Supersede),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown checkout concurrency: '{}'. Valid options: reject, supersede",
                other
            ))),
        }
    }
}

// =============================================================================
// Settings Sections
// =============================================================================

/// Cart mutation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSettings {
    #[serde(default)]
    pub quantity_policy: QuantityPolicy,
}

/// Checkout orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Overlapping checkout behavior.
    #[serde(default)]
    pub concurrency: CheckoutConcurrency,

    /// Upper bound on one collaborator call (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            concurrency: CheckoutConcurrency::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CheckoutSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl StoreConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (basket.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.checkout.timeout_ms == 0 {
            return Err(StoreError::InvalidConfig(
                "checkout.timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup (the process environment in
    /// [`StoreConfig::load`]). Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = lookup("BASKET_QUANTITY_POLICY") {
            match policy.parse::<QuantityPolicy>() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding quantity policy from environment");
                    self.cart.quantity_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring BASKET_QUANTITY_POLICY"),
            }
        }

        if let Some(mode) = lookup("BASKET_CHECKOUT_CONCURRENCY") {
            match mode.parse::<CheckoutConcurrency>() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding checkout concurrency from environment");
                    self.checkout.concurrency = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring BASKET_CHECKOUT_CONCURRENCY"),
            }
        }

        if let Some(timeout) = lookup("BASKET_CHECKOUT_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => {
                    debug!(timeout_ms = ms, "Overriding checkout timeout from environment");
                    self.checkout.timeout_ms = ms;
                }
                Err(_) => warn!(value = %timeout, "Ignoring BASKET_CHECKOUT_TIMEOUT_MS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "basket", "basket")
            .map(|dirs| dirs.config_dir().join("basket.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("accept".parse::<QuantityPolicy>().unwrap(), QuantityPolicy::Accept);
        assert_eq!("STRICT".parse::<QuantityPolicy>().unwrap(), QuantityPolicy::Reject);
        assert_eq!("remove".parse::<QuantityPolicy>().unwrap(), QuantityPolicy::Remove);
        assert!("clamp".parse::<QuantityPolicy>().is_err());

        assert_eq!(
            "supersede".parse::<CheckoutConcurrency>().unwrap(),
            CheckoutConcurrency::Supersede
        );
        assert!("queue".parse::<CheckoutConcurrency>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.cart.quantity_policy, QuantityPolicy::Accept);
        assert_eq!(config.checkout.concurrency, CheckoutConcurrency::Reject);
        assert_eq!(config.checkout.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();
        config.checkout.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BASKET_QUANTITY_POLICY", "remove"),
            ("BASKET_CHECKOUT_CONCURRENCY", "nonsense"),
            ("BASKET_CHECKOUT_TIMEOUT_MS", "1500"),
        ]
        .into_iter()
        .collect();

        let mut config = StoreConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.cart.quantity_policy, QuantityPolicy::Remove);
        // Bad value ignored
        assert_eq!(config.checkout.concurrency, CheckoutConcurrency::Reject);
        assert_eq!(config.checkout.timeout_ms, 1500);
    }

    #[test]
    fn test_partial_toml() {
        let config: StoreConfig = toml::from_str(
            r#"
            [checkout]
            concurrency = "supersede"
            "#,
        )
        .unwrap();
        assert_eq!(config.checkout.concurrency, CheckoutConcurrency::Supersede);
        assert_eq!(config.checkout.timeout_ms, 30_000);
        assert_eq!(config.cart.quantity_policy, QuantityPolicy::Accept);
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&StoreConfig::default()).unwrap();
        assert!(toml_str.contains("[cart]"));
        assert!(toml_str.contains("[checkout]"));
        assert!(toml_str.contains("quantity_policy = \"accept\""));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("basket-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("basket.toml");

        let mut config = StoreConfig::default();
        config.cart.quantity_policy = QuantityPolicy::Reject;
        config.checkout.timeout_ms = 2_000;
        config.save(Some(path.clone())).unwrap();

        let loaded: StoreConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.cart.quantity_policy, QuantityPolicy::Reject);
        assert_eq!(loaded.checkout.timeout_ms, 2_000);

        let _ = std::fs::remove_dir_all(dir);
    }
}
