//! Partner identity and adapter behaviour settings.

use serde::Deserialize;

use crate::application::TargetingMode;
use crate::domain::BucketConfig;

pub const DEFAULT_BASE_URL: &str = "https://apex.go.sonobi.com/trinity.js";
pub const DEFAULT_CALLBACK_NAME: &str = "sbi";

/// Who the adapter reports as in logs and events.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerConfig {
    #[serde(default = "default_partner_id")]
    pub id: String,
    #[serde(default)]
    pub targeting_keys: TargetingKeys,
    /// Emit per-slot request lifecycle events.
    #[serde(default = "default_true")]
    pub analytics: bool,
}

fn default_partner_id() -> String {
    "SonobiHtb".into()
}

const fn default_true() -> bool {
    true
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            id: default_partner_id(),
            targeting_keys: TargetingKeys::default(),
            analytics: true,
        }
    }
}

/// Targeting key names.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetingKeys {
    /// Key for the `<size>_<bucket>` value.
    #[serde(default = "default_om_key")]
    pub om: String,
}

fn default_om_key() -> String {
    "ix_sbi_om".into()
}

impl Default for TargetingKeys {
    fn default() -> Self {
        Self {
            om: default_om_key(),
        }
    }
}

/// How returned bids are turned into line-item targeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    #[default]
    IdAndSize,
    Custom,
}

impl LineItemType {
    #[must_use]
    pub fn targeting_mode(self) -> TargetingMode {
        match self {
            Self::IdAndSize => TargetingMode::Bucketed,
            Self::Custom => TargetingMode::PassThrough,
        }
    }
}

/// Which price outputs a deployment produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deployment {
    /// Targeting buckets and a numeric price.
    #[default]
    Universal,
    TargetingOnly,
    PriceOnly,
}

impl Deployment {
    #[must_use]
    pub fn produces_targeting(self) -> bool {
        matches!(self, Self::Universal | Self::TargetingOnly)
    }

    #[must_use]
    pub fn produces_price(self) -> bool {
        matches!(self, Self::Universal | Self::PriceOnly)
    }
}

/// Request and response handling for the partner endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Callback the endpoint wraps its response in.
    #[serde(default = "default_callback_name")]
    pub callback_name: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub line_item_type: LineItemType,
    #[serde(default)]
    pub deployment: Deployment,
    #[serde(default)]
    pub return_creative: bool,
    /// Overrides the targeting bucket configuration.
    #[serde(default)]
    pub bid_transformer: Option<BucketConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_callback_name() -> String {
    DEFAULT_CALLBACK_NAME.into()
}

const fn default_timeout_ms() -> u64 {
    1000
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            callback_name: default_callback_name(),
            timeout_ms: default_timeout_ms(),
            line_item_type: LineItemType::default(),
            deployment: Deployment::default(),
            return_creative: false,
            bid_transformer: None,
        }
    }
}

impl AdapterConfig {
    /// Bucket configuration for targeting values, if the deployment wants them.
    #[must_use]
    pub fn targeting_buckets(&self) -> Option<BucketConfig> {
        self.deployment.produces_targeting().then(|| {
            self.bid_transformer
                .clone()
                .unwrap_or_else(BucketConfig::default_targeting)
        })
    }

    /// Bucket configuration for numeric prices, if the deployment wants them.
    ///
    /// Shares the input multiplier of an overriding bid transformer.
    #[must_use]
    pub fn price_buckets(&self) -> Option<BucketConfig> {
        self.deployment.produces_price().then(|| {
            let mut config = BucketConfig::default_price();
            if let Some(custom) = &self.bid_transformer {
                config.input_cents_multiplier = custom.input_cents_multiplier;
            }
            config
        })
    }
}
