use crate::types::TravelPlanInput;

/// Render the instruction sent to the completion endpoint.
///
/// The JSON shape embedded here is the one [`crate::parser::parse_response`]
/// understands; keep the two in step.
pub fn build_travel_prompt(input: &TravelPlanInput) -> String {
    let country = input.country.trim();
    let days = input.days;

    let mut prompt = format!(
        r#"Create a detailed {days}-day travel itinerary for {country}.

Respond only with JSON of the following form:
{{
    "country": "{country}",
    "days": {days},
    "title": "Plan title",
    "description": "One paragraph overview of the trip",
    "itinerary": [
        {{
            "day": 1,
            "title": "Day title",
            "activities": [
                {{"time": "09:00", "activity": "What to do", "location": "Where", "cost": 20, "duration": "2 hours"}}
            ],
            "estimated_cost": 100,
            "notes": "Additional notes for the day"
        }}
    ],
    "total_estimated_cost": 500,
    "currency": "USD",
    "best_time_to_visit": "Best time to visit information",
    "cultural_tips": "Cultural tips and etiquette"
}}

The itinerary must contain exactly {days} entries numbered 1 to {days}.
Include popular attractions, local experiences, restaurants, and practical tips.
Make sure each day has 3-5 activities and provide helpful notes.
"#
    );

    let mut guidance = Vec::new();

    if let Some(budget) = input.budget_range {
        guidance.push(format!(
            "Budget: {} (around {} USD per person per day).",
            budget.label(),
            budget.daily_budget()
        ));
    }

    if !input.preferences.is_empty() {
        let interests = input
            .preferences
            .iter()
            .map(|p| p.label())
            .collect::<Vec<_>>()
            .join(", ");
        guidance.push(format!("Traveller interests: {}.", interests));
    }

    if let Some(group_size) = input.group_size {
        guidance.push(format!("Group size: {} people.", group_size));
    }

    if let (Some(start), Some(end)) = (input.start_date, input.end_date()) {
        guidance.push(format!(
            "Travel dates: {} to {}.",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ));
    }

    if let Some(requirements) = input
        .additional_requirements
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        guidance.push(format!("Additional requirements: {}", requirements));
    }

    if !guidance.is_empty() {
        prompt.push_str("\nTake the following into account:\n");
        for line in guidance {
            prompt.push_str("- ");
            prompt.push_str(&line);
            prompt.push('\n');
        }
    }

    prompt
}
