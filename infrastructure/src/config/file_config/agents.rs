//! Agent configuration from TOML (`[agents]` section)

use serde::{Deserialize, Serialize};

/// One tariff table entry. Unset `country` or `product` matches anything.
///
/// ```toml
/// [[agents.tariff_rates]]
/// country = "China"
/// product = "steel"
/// rate = 25.0
/// note = "Section 232"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTariffRate {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    /// Ad valorem rate in percent
    pub rate: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Raw agent configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    /// Rate used when no table entry matches
    pub default_tariff_rate: f64,
    /// Extra entries, checked before the built-in table
    pub tariff_rates: Vec<FileTariffRate>,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            default_tariff_rate: 5.0,
            tariff_rates: Vec::new(),
        }
    }
}
