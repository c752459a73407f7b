use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    completion::{CompletionClient, GenerationParams},
    fallback::generate_fallback_plan,
    parser::parse_response,
    prompt::build_travel_prompt,
    types::{TravelPlan, TravelPlanInput},
};

/// Longest slice of a bad reply that ends up in the logs
const RAW_LOG_LIMIT: usize = 500;

/// Where a generated plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Generated,
    FallbackAfterParseError,
    FallbackAfterTransportError,
}

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: TravelPlan,
    pub provenance: Provenance,
}

/// Prompt -> completion -> parse, with the fallback generator behind every step.
///
/// Both parse failures and transport failures end in a fallback plan, so
/// [`TravelPlanner::generate`] has no error path.
#[derive(Clone)]
pub struct TravelPlanner {
    client: Arc<dyn CompletionClient>,
    params: GenerationParams,
}

impl TravelPlanner {
    pub fn new(client: Arc<dyn CompletionClient>, params: GenerationParams) -> Self {
        Self { client, params }
    }

    pub async fn generate(&self, input: &TravelPlanInput) -> GeneratedPlan {
        let prompt = build_travel_prompt(input);

        let raw = match self.client.complete(&prompt, &self.params).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    country = %input.country,
                    days = input.days,
                    error = %e,
                    "Completion request failed, using fallback plan"
                );
                return GeneratedPlan {
                    plan: generate_fallback_plan(input),
                    provenance: Provenance::FallbackAfterTransportError,
                };
            }
        };

        match parse_response(&raw, input) {
            Ok(plan) => {
                info!(
                    country = %plan.country,
                    days = plan.days,
                    "Parsed generated travel plan"
                );
                GeneratedPlan {
                    plan,
                    provenance: Provenance::Generated,
                }
            }
            Err(e) => {
                warn!(
                    country = %input.country,
                    days = input.days,
                    error = %e,
                    raw = %truncate(&raw, RAW_LOG_LIMIT),
                    "Could not parse completion, using fallback plan"
                );
                GeneratedPlan {
                    plan: generate_fallback_plan(input),
                    provenance: Provenance::FallbackAfterParseError,
                }
            }
        }
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
