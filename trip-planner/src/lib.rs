//! Travel itinerary generation backed by a chat-completions model.
//!
//! A request flows through [`prompt::build_travel_prompt`], a
//! [`CompletionClient`], and [`parser::parse_response`]. When the model is
//! unreachable or its reply cannot be decoded, [`fallback::generate_fallback_plan`]
//! produces a deterministic plan instead.

pub mod completion;
pub mod error;
pub mod fallback;
pub mod parser;
pub mod planner;
pub mod prompt;
pub mod types;

// Re-export commonly used types
pub use completion::{ChatCompletionsClient, CompletionClient, GenerationParams};
pub use error::{PlannerError, Result};
pub use fallback::generate_fallback_plan;
pub use parser::{parse_response, strip_code_fence};
pub use planner::{GeneratedPlan, Provenance, TravelPlanner};
pub use prompt::build_travel_prompt;
pub use types::{
    Activity, BudgetRange, DEFAULT_MAX_DAYS, DayItinerary, GenerationResponse, TravelPlan,
    TravelPlanInput, TravelPreference,
};
