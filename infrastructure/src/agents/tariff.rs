//! Tariff rate lookups and duty estimates.

use super::{Agent, Route, product_key, products};
use crate::config::FileAgentsConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tradedesk_application::AgentError;
use tradedesk_domain::analysis::extractor::parse_amount;
use tradedesk_domain::query::entity::values_of;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType, EntityType};

/// One row of the tariff table. `None` matches any country or product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffRate {
    pub country: Option<String>,
    pub product: Option<String>,
    /// Ad valorem rate in percent
    pub rate: f64,
    pub note: Option<String>,
}

impl TariffRate {
    pub fn new(country: Option<&str>, product: Option<&str>, rate: f64) -> Self {
        Self {
            country: country.map(str::to_string),
            product: product.map(product_key),
            rate,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Match score: `None` when the row does not apply, otherwise higher is
    /// more specific. A product match outranks a country match.
    fn specificity(&self, country: Option<&str>, product: Option<&str>) -> Option<u8> {
        let country_score = match (&self.country, country) {
            (None, _) => 0,
            (Some(row), Some(wanted)) if row.eq_ignore_ascii_case(wanted) => 1,
            _ => return None,
        };
        let product_score = match (&self.product, product) {
            (None, _) => 0,
            (Some(row), Some(wanted)) if *row == product_key(wanted) => 2,
            _ => return None,
        };
        Some(country_score + product_score)
    }
}

/// Illustrative import rates into the United States.
const BUILTIN_RATES: &[(Option<&str>, Option<&str>, f64, &str)] = &[
    (Some("China"), Some("steel"), 25.0, "Section 232 plus Section 301"),
    (Some("China"), Some("electronic"), 25.0, "Section 301 List 3"),
    (Some("China"), Some("semiconductor"), 50.0, "Section 301"),
    (Some("China"), Some("solar panel"), 50.0, "Section 301"),
    (Some("China"), None, 7.5, "Section 301 List 4A"),
    (Some("Germany"), Some("vehicle"), 2.5, "MFN rate"),
    (Some("Germany"), Some("car"), 2.5, "MFN rate"),
    (Some("Japan"), Some("vehicle"), 2.5, "MFN rate"),
    (Some("Japan"), Some("car"), 2.5, "MFN rate"),
    (Some("Mexico"), None, 0.0, "USMCA preferential rate"),
    (Some("Canada"), None, 0.0, "USMCA preferential rate"),
    (Some("South Korea"), None, 0.0, "KORUS preferential rate"),
    (Some("Australia"), None, 0.0, "AUSFTA preferential rate"),
    (Some("Singapore"), None, 0.0, "USSFTA preferential rate"),
    (None, Some("steel"), 25.0, "Section 232"),
    (None, Some("aluminum"), 10.0, "Section 232"),
    (None, Some("textile"), 12.0, "MFN rate"),
    (None, Some("clothing"), 16.5, "MFN rate"),
    (None, Some("vehicle"), 2.5, "MFN rate"),
    (None, Some("car"), 2.5, "MFN rate"),
    (None, Some("furniture"), 0.0, "MFN rate"),
    (None, Some("electronic"), 0.0, "ITA duty-free"),
    (None, Some("semiconductor"), 0.0, "ITA duty-free"),
    (None, Some("toy"), 0.0, "MFN rate"),
];

/// Rate lookup with most-specific-match semantics.
///
/// Configured rows are consulted before built-in ones, so a configured row
/// wins over a built-in row of equal specificity.
#[derive(Debug, Clone)]
pub struct TariffTable {
    rates: Vec<TariffRate>,
    default_rate: f64,
}

impl TariffTable {
    pub fn new(default_rate: f64) -> Self {
        Self {
            rates: Vec::new(),
            default_rate,
        }
    }

    /// Built-in rows plus the `[agents]` configuration.
    pub fn from_config(config: &FileAgentsConfig) -> Self {
        let configured = config.tariff_rates.iter().map(|entry| {
            let rate = TariffRate::new(entry.country.as_deref(), entry.product.as_deref(), entry.rate);
            match &entry.note {
                Some(note) => rate.with_note(note.clone()),
                None => rate.with_note("configured rate"),
            }
        });
        let builtin = BUILTIN_RATES
            .iter()
            .map(|(country, product, rate, note)| TariffRate::new(*country, *product, *rate).with_note(*note));

        Self {
            rates: configured.chain(builtin).collect(),
            default_rate: config.default_tariff_rate,
        }
    }

    pub fn with_rate(mut self, rate: TariffRate) -> Self {
        self.rates.push(rate);
        self
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn lookup(&self, country: Option<&str>, product: Option<&str>) -> TariffRate {
        let mut best: Option<(u8, &TariffRate)> = None;
        for row in &self.rates {
            if let Some(score) = row.specificity(country, product)
                && best.is_none_or(|(top, _)| score > top)
            {
                best = Some((score, row));
            }
        }

        match best {
            Some((_, row)) => TariffRate {
                country: country.map(str::to_string),
                product: product.map(product_key),
                ..row.clone()
            },
            None => TariffRate {
                country: country.map(str::to_string),
                product: product.map(product_key),
                rate: self.default_rate,
                note: Some("default rate".to_string()),
            },
        }
    }
}

/// Looks up tariff rates for every origin and product in the query.
pub struct TariffAgent {
    table: TariffTable,
}

impl TariffAgent {
    pub fn new(table: TariffTable) -> Self {
        Self { table }
    }
}

fn describe(rate: &TariffRate) -> String {
    format!(
        "{} from {}",
        rate.product.as_deref().unwrap_or("goods"),
        rate.country.as_deref().unwrap_or("any origin")
    )
}

#[async_trait]
impl Agent for TariffAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::TariffAnalysis
    }

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let query = request.query();
        if query.trim().is_empty() {
            return Err(AgentError::InvalidParameters("query is empty".to_string()));
        }

        let entities = request.entities();
        let route = Route::from_query(query, &entities);
        let destination = route.destination_or_default().to_string();

        let origins: Vec<Option<&str>> = if route.origins.is_empty() {
            vec![None]
        } else {
            route.origins.iter().map(|o| Some(o.as_str())).collect()
        };
        let product_keys = products(&entities);
        let wanted_products: Vec<Option<&str>> = if product_keys.is_empty() {
            vec![None]
        } else {
            product_keys.iter().map(|p| Some(p.as_str())).collect()
        };

        let rates: Vec<TariffRate> = wanted_products
            .iter()
            .flat_map(|product| origins.iter().map(|origin| self.table.lookup(*origin, *product)))
            .collect();
        debug!("Tariff lookup produced {} rates into {}", rates.len(), destination);

        let mut lines = vec![format!("Tariff rates for imports into {}:", destination)];
        for rate in &rates {
            lines.push(format!(
                "- {}: {:.1}% ({})",
                describe(rate),
                rate.rate,
                rate.note.as_deref().unwrap_or("default rate")
            ));
        }

        let amounts: Vec<f64> = values_of(&entities, EntityType::MonetaryAmount)
            .into_iter()
            .filter_map(parse_amount)
            .collect();
        if let Some(&amount) = amounts.first() {
            for rate in &rates {
                lines.push(format!(
                    "Estimated duty on ${:.2} of {}: ${:.2}",
                    amount,
                    describe(rate),
                    amount * rate.rate / 100.0
                ));
            }
        }

        let mut insights = Vec::new();
        if rates.len() > 1
            && let Some(lowest) = rates.iter().min_by(|a, b| a.rate.total_cmp(&b.rate))
        {
            insights.push(format!("Lowest rate: {:.1}% for {}", lowest.rate, describe(lowest)));
        }
        if rates.iter().any(|r| r.rate >= 25.0) {
            insights.push("Additional duties (Section 232/301) apply to some origins".to_string());
        }
        for code in values_of(&entities, EntityType::HsCode) {
            insights.push(format!("Verify classification under HS {}", code));
        }

        Ok(AgentOutput::success(lines.join("\n"))
            .with_insights(insights)
            .with_data(json!({
                "destination": destination,
                "rates": rates,
            })))
    }
}
