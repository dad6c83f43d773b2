//! Import documentation checklists.

use super::{Agent, Route, products};
use async_trait::async_trait;
use serde_json::json;
use tradedesk_application::AgentError;
use tradedesk_domain::{AgentOutput, AgentRequest, AgentType};

const STANDARD_DOCUMENTS: [&str; 4] = [
    "Commercial Invoice",
    "Packing List",
    "Bill of Lading/Air Waybill",
    "Import Declaration/Entry Form",
];

const EU_MEMBERS: [&str; 20] = [
    "Germany",
    "France",
    "Italy",
    "Spain",
    "Netherlands",
    "Belgium",
    "Sweden",
    "Denmark",
    "Finland",
    "Poland",
    "Czech Republic",
    "Hungary",
    "Romania",
    "Bulgaria",
    "Greece",
    "Portugal",
    "Ireland",
    "Austria",
    "Luxembourg",
    "Croatia",
];

fn destination_documents(destination: &str) -> &'static [&'static str] {
    match destination {
        "United States" => &[
            "CBP Form 3461 (Entry/Immediate Delivery)",
            "CBP Form 7501 (Entry Summary)",
            "Importer Security Filing (ISF)",
        ],
        "Canada" => &["CBSA Form B3 (Canada Customs Coding Form)", "CFIA permits (if applicable)"],
        "United Kingdom" => &["UK Import Declaration", "EORI Number registration"],
        d if EU_MEMBERS.contains(&d) => &[
            "EU Import Declaration (SAD)",
            "EORI Number",
            "CE Marking (if applicable)",
        ],
        _ => &[],
    }
}

fn product_documents(product: &str) -> &'static [&'static str] {
    match product {
        "food" | "beverage" => &["FDA Prior Notice", "Food facility registration"],
        "pharmaceutical" | "medical device" => &["FDA establishment registration and device listing"],
        "electronic" | "smartphone" | "computer" | "semiconductor" => {
            &["FCC Declaration of Conformity"]
        }
        "toy" => &["Children's Product Certificate (CPSC)"],
        "vehicle" | "car" | "automobile" => &["DOT HS-7 declaration", "EPA Form 3520-1"],
        "steel" | "aluminum" => &["Import license (steel/aluminum monitoring)"],
        "wood" | "lumber" | "furniture" => &["Lacey Act declaration"],
        "chemical" => &["TSCA certification"],
        _ => &[],
    }
}

/// Trade agreement partners per destination.
fn preferential_partners(destination: &str) -> &'static [&'static str] {
    match destination {
        "United States" => &["Canada", "Mexico", "South Korea", "Australia", "Singapore"],
        "Canada" => &["United States", "Mexico", "South Korea", "Japan", "Australia"],
        "Mexico" => &["United States", "Canada", "Japan"],
        "United Kingdom" => &["Japan", "Australia", "Canada", "Singapore"],
        _ => &[],
    }
}

/// Lists the documents an import needs for its destination and products.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComplianceAgent;

impl ComplianceAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for ComplianceAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Compliance
    }

    async fn execute(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let entities = request.entities();
        let route = Route::from_query(request.query(), &entities);
        let destination = route.destination_or_default();

        let mut documents: Vec<String> = STANDARD_DOCUMENTS.iter().map(|d| d.to_string()).collect();
        documents.extend(destination_documents(destination).iter().map(|d| d.to_string()));

        let mut product_specific: Vec<String> = Vec::new();
        for product in products(&entities) {
            for document in product_documents(&product) {
                if !product_specific.iter().any(|d| d == document) {
                    product_specific.push(document.to_string());
                }
            }
        }

        let partners = preferential_partners(destination);
        let preferential: Vec<&String> = route
            .origins
            .iter()
            .filter(|origin| partners.contains(&origin.as_str()))
            .collect();

        let mut lines = vec![format!("Required documents for import into {}:", destination)];
        lines.extend(documents.iter().map(|d| format!("- {}", d)));
        if !product_specific.is_empty() {
            lines.push("Product-specific documents:".to_string());
            lines.extend(product_specific.iter().map(|d| format!("- {}", d)));
        }

        let mut insights = Vec::new();
        if !preferential.is_empty() {
            lines.push("Preferential origin documents:".to_string());
            lines.push("- Certificate of Origin".to_string());
            lines.push("- Supplier's Declaration".to_string());
            for origin in &preferential {
                insights.push(format!(
                    "Goods from {} may qualify for preferential treatment with a Certificate of Origin",
                    origin
                ));
            }
        }
        if route.destination.is_none() {
            insights.push("No destination given; assuming import into the United States".to_string());
        }

        let all_documents: Vec<&String> = documents.iter().chain(product_specific.iter()).collect();
        Ok(AgentOutput::success(lines.join("\n"))
            .with_insights(insights)
            .with_data(json!({
                "destination": destination,
                "documents": all_documents,
                "preferential_origins": preferential,
            })))
    }
}
