use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PlannerError, Result};

/// Default ceiling on the number of days a single plan may cover
pub const DEFAULT_MAX_DAYS: u32 = 30;

/// Spending tier used to scale fallback costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetRange {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl BudgetRange {
    /// Nominal spend per day in USD
    pub fn daily_budget(self) -> u32 {
        match self {
            BudgetRange::Budget => 50,
            BudgetRange::Moderate => 100,
            BudgetRange::Luxury => 200,
        }
    }

    /// Activity cost multiplier expressed in percent
    pub(crate) fn cost_percent(self) -> u32 {
        match self {
            BudgetRange::Budget => 60,
            BudgetRange::Moderate => 100,
            BudgetRange::Luxury => 200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BudgetRange::Budget => "budget",
            BudgetRange::Moderate => "moderate",
            BudgetRange::Luxury => "luxury",
        }
    }
}

/// Interest tags a traveller can attach to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelPreference {
    Culture,
    Food,
    Adventure,
    Nature,
    History,
    Relaxation,
    Shopping,
    Nightlife,
}

impl TravelPreference {
    pub fn label(self) -> &'static str {
        match self {
            TravelPreference::Culture => "culture",
            TravelPreference::Food => "food",
            TravelPreference::Adventure => "adventure",
            TravelPreference::Nature => "nature",
            TravelPreference::History => "history",
            TravelPreference::Relaxation => "relaxation",
            TravelPreference::Shopping => "shopping",
            TravelPreference::Nightlife => "nightlife",
        }
    }
}

/// Request for a generated travel plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPlanInput {
    pub country: String,
    pub days: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget_range: Option<BudgetRange>,
    #[serde(default, deserialize_with = "dedup_preferences")]
    pub preferences: Vec<TravelPreference>,
    #[serde(default)]
    pub group_size: Option<u32>,
    #[serde(default)]
    pub additional_requirements: Option<String>,
}

impl TravelPlanInput {
    pub fn new(country: impl Into<String>, days: u32) -> Self {
        Self {
            country: country.into(),
            days,
            start_date: None,
            budget_range: None,
            preferences: Vec::new(),
            group_size: None,
            additional_requirements: None,
        }
    }

    pub fn with_budget(mut self, budget: BudgetRange) -> Self {
        self.budget_range = Some(budget);
        self
    }

    /// Appends preferences, ignoring tags that are already present.
    pub fn with_preferences(mut self, preferences: impl IntoIterator<Item = TravelPreference>) -> Self {
        for preference in preferences {
            if !self.preferences.contains(&preference) {
                self.preferences.push(preference);
            }
        }
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_group_size(mut self, group_size: u32) -> Self {
        self.group_size = Some(group_size);
        self
    }

    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.additional_requirements = Some(requirements.into());
        self
    }

    /// Budget tier, defaulting to moderate when the caller gave none
    pub fn budget(&self) -> BudgetRange {
        self.budget_range.unwrap_or_default()
    }

    /// Last day of the trip, or `None` without a start date or when the
    /// range runs off the end of the calendar.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start_date?
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
    }

    /// Check the request against the accepted day range.
    pub fn validate(&self, max_days: u32) -> Result<()> {
        if self.country.trim().is_empty() {
            return Err(PlannerError::Validation("Country is required".to_string()));
        }
        if self.days == 0 {
            return Err(PlannerError::Validation(
                "Travel plans must cover at least 1 day".to_string(),
            ));
        }
        if self.days > max_days {
            return Err(PlannerError::Validation(format!(
                "Travel plans longer than {} days are not supported",
                max_days
            )));
        }
        if self.group_size == Some(0) {
            return Err(PlannerError::Validation(
                "Group size must be at least 1".to_string(),
            ));
        }
        if self.start_date.is_some() && self.end_date().is_none() {
            return Err(PlannerError::Validation(
                "Travel dates fall outside the supported calendar range".to_string(),
            ));
        }
        Ok(())
    }
}

fn dedup_preferences<'de, D>(deserializer: D) -> std::result::Result<Vec<TravelPreference>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<TravelPreference>>::deserialize(deserializer)?.unwrap_or_default();
    let mut preferences = Vec::with_capacity(raw.len());
    for preference in raw {
        if !preferences.contains(&preference) {
            preferences.push(preference);
        }
    }
    Ok(preferences)
}

/// One scheduled activity. All fields are informational.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(alias = "activity")]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl Activity {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Plan for a single day of the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayItinerary {
    pub day_number: u32,
    pub date: Option<NaiveDate>,
    pub title: String,
    pub activities: Vec<Activity>,
    pub estimated_cost: Option<f64>,
    pub notes: Option<String>,
}

/// Complete travel plan returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPlan {
    pub country: String,
    pub days: u32,
    pub title: String,
    pub description: Option<String>,
    pub itinerary: Vec<DayItinerary>,
    pub total_estimated_cost: Option<f64>,
    pub currency: String,
    pub best_time_to_visit: Option<String>,
    pub cultural_tips: Option<String>,
    /// True when the itinerary came from the model rather than the fallback generator
    pub gemini_generated: bool,
}

/// Uniform envelope for the generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub travel_plan: Option<TravelPlan>,
    pub error_message: Option<String>,
    pub generation_time_seconds: Option<f64>,
}

impl GenerationResponse {
    pub fn success(plan: TravelPlan, elapsed_seconds: f64) -> Self {
        Self {
            success: true,
            travel_plan: Some(plan),
            error_message: None,
            generation_time_seconds: Some(elapsed_seconds),
        }
    }

    pub fn failure(message: impl Into<String>, elapsed_seconds: f64) -> Self {
        Self {
            success: false,
            travel_plan: None,
            error_message: Some(message.into()),
            generation_time_seconds: Some(elapsed_seconds),
        }
    }
}
