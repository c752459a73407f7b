use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{PlannerError, Result};
use crate::types::{Activity, DayItinerary, TravelPlan, TravelPlanInput};

/// Remove the optional markdown fence models like to wrap JSON in.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Turn raw completion text into a plan.
///
/// Top-level keys missing from the reply fall back to the request. Every
/// failure is reported as [`PlannerError::Parse`] so the caller can switch to
/// the fallback generator.
pub fn parse_response(raw: &str, input: &TravelPlanInput) -> Result<TravelPlan> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| PlannerError::Parse(format!("invalid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| PlannerError::Parse("reply is not a JSON object".to_string()))?;

    let country = optional_str(object, "country")?
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| input.country.trim().to_string());

    let days = match object.get("days") {
        None | Some(Value::Null) => input.days,
        Some(v) => as_u32(v, "days")?,
    };

    let itinerary = match object.get("itinerary") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(parse_day)
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(PlannerError::Parse(
                "`itinerary` is not an array".to_string(),
            ));
        }
    };

    if itinerary.len() != days as usize {
        return Err(PlannerError::Parse(format!(
            "itinerary has {} entries but the plan covers {} days",
            itinerary.len(),
            days
        )));
    }

    let title = optional_str(object, "title")?
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-Day {} Adventure", days, country));

    let total_estimated_cost = match object.get("total_estimated_cost") {
        None | Some(Value::Null) => itinerary
            .iter()
            .map(|d| d.estimated_cost)
            .sum::<Option<f64>>(),
        Some(v) => Some(as_cost(v, "total_estimated_cost")?),
    };

    Ok(TravelPlan {
        country,
        days,
        title,
        description: optional_str(object, "description")?.map(str::to_string),
        itinerary,
        total_estimated_cost,
        currency: optional_str(object, "currency")?
            .unwrap_or("USD")
            .to_string(),
        best_time_to_visit: optional_str(object, "best_time_to_visit")?.map(str::to_string),
        cultural_tips: optional_str(object, "cultural_tips")?.map(str::to_string),
        gemini_generated: true,
    })
}

fn parse_day(entry: &Value) -> Result<DayItinerary> {
    let day = entry
        .as_object()
        .ok_or_else(|| PlannerError::Parse("itinerary entry is not an object".to_string()))?;

    let day_number = match day.get("day").or_else(|| day.get("day_number")) {
        None | Some(Value::Null) => 1,
        Some(v) => as_u32(v, "day")?,
    };

    let title = optional_str(day, "title")?
        .map(str::to_string)
        .unwrap_or_else(|| format!("Day {}", day_number));

    let activities = match day.get("activities") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(parse_activity)
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(PlannerError::Parse(format!(
                "day {} `activities` is not an array",
                day_number
            )));
        }
    };

    let date = optional_str(day, "date")?
        .map(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| PlannerError::Parse(format!("day {} has a bad date: {}", day_number, e)))
        })
        .transpose()?;

    let estimated_cost = match day.get("estimated_cost") {
        None | Some(Value::Null) => None,
        Some(v) => Some(as_cost(v, "estimated_cost")?),
    };

    Ok(DayItinerary {
        day_number,
        date,
        title,
        activities,
        estimated_cost,
        notes: Some(optional_str(day, "notes")?.unwrap_or_default().to_string()),
    })
}

fn parse_activity(item: &Value) -> Result<Activity> {
    match item {
        Value::String(text) => Ok(Activity::described(text.clone())),
        Value::Object(_) => serde_json::from_value(item.clone())
            .map_err(|e| PlannerError::Parse(format!("bad activity record: {}", e))),
        _ => Err(PlannerError::Parse(
            "activity is neither text nor an object".to_string(),
        )),
    }
}

fn optional_str<'a>(object: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(PlannerError::Parse(format!("`{}` is not a string", key))),
    }
}

fn as_u32(value: &Value, key: &str) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| PlannerError::Parse(format!("`{}` is not a positive integer", key)))
}

fn as_cost(value: &Value, key: &str) -> Result<f64> {
    value
        .as_f64()
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| PlannerError::Parse(format!("`{}` is not a non-negative number", key)))
}
