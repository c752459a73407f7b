//! Deterministic itinerary used whenever the model reply is unusable.
//!
//! Nothing in here is random: the same request always yields the same plan.

use chrono::Days;

use crate::types::{Activity, BudgetRange, DayItinerary, TravelPlan, TravelPlanInput, TravelPreference};

/// Day themes in visiting order. Days past the end reuse the last entry.
pub const DAY_THEMES: [&str; 11] = [
    "Arrival",
    "Cultural Exploration",
    "Local Cuisine",
    "Historical Sites",
    "Nature",
    "Art & Museums",
    "Local Neighborhoods",
    "Adventure",
    "Relaxation",
    "Shopping",
    "Departure",
];

struct ActivitySlot {
    time: &'static str,
    duration: &'static str,
    base_cost: u32,
}

const ACTIVITY_SLOTS: [ActivitySlot; 5] = [
    ActivitySlot { time: "08:00", duration: "1 hour", base_cost: 15 },
    ActivitySlot { time: "10:00", duration: "2-3 hours", base_cost: 25 },
    ActivitySlot { time: "13:00", duration: "1 hour", base_cost: 20 },
    ActivitySlot { time: "15:00", duration: "2 hours", base_cost: 10 },
    ActivitySlot { time: "19:00", duration: "2 hours", base_cost: 35 },
];

fn preference_theme(preference: TravelPreference) -> Option<&'static str> {
    match preference {
        TravelPreference::Culture => Some("Cultural Immersion"),
        TravelPreference::Food => Some("Culinary Journey"),
        TravelPreference::Adventure => Some("Adventure & Thrills"),
        TravelPreference::Nature => Some("Nature Exploration"),
        TravelPreference::History => Some("Historical Discovery"),
        _ => None,
    }
}

/// Theme for a 1-based day, honouring the caller's preferences first.
pub fn day_theme(day: u32, preferences: &[TravelPreference]) -> &'static str {
    let index = day.saturating_sub(1) as usize;
    let base = DAY_THEMES[index.min(DAY_THEMES.len() - 1)];

    preferences
        .get(index)
        .and_then(|p| preference_theme(*p))
        .unwrap_or(base)
}

/// Cost of one activity slot after budget scaling, truncated to whole units.
fn slot_cost(base_cost: u32, budget: BudgetRange) -> f64 {
    f64::from(base_cost * budget.cost_percent() / 100)
}

/// `daily_budget * (0.8 + (day mod 3) * 0.1)`, computed in tenths to stay exact.
pub fn daily_estimate(day: u32, budget: BudgetRange) -> f64 {
    f64::from(budget.daily_budget() * (8 + day % 3)) / 10.0
}

fn day_activities(country: &str, theme: &str, budget: BudgetRange) -> Vec<Activity> {
    let descriptions = [
        ("Breakfast at a local café", "Near your accommodation".to_string()),
        (
            "Visit a signature attraction",
            format!("{} highlight for {}", country, theme.to_lowercase()),
        ),
        ("Lunch featuring regional dishes", "City centre".to_string()),
        ("Browse a local market", format!("Popular market in {}", country)),
        ("Dinner at a recommended restaurant", "Dining district".to_string()),
    ];

    ACTIVITY_SLOTS
        .iter()
        .zip(descriptions)
        .map(|(slot, (description, location))| Activity {
            time: Some(slot.time.to_string()),
            description: description.to_string(),
            location: Some(location),
            cost: Some(slot_cost(slot.base_cost, budget)),
            duration: Some(slot.duration.to_string()),
        })
        .collect()
}

/// Build a complete plan without calling out to any model.
pub fn generate_fallback_plan(input: &TravelPlanInput) -> TravelPlan {
    let country = input.country.trim();
    let budget = input.budget();

    let itinerary = (1..=input.days)
        .map(|day| {
            let theme = day_theme(day, &input.preferences);
            let mut notes = format!("Day {} of {} in {}.", day, input.days, country);
            if let Some(group_size) = input.group_size.filter(|g| *g > 1) {
                notes.push_str(&format!(" Book ahead for a group of {}.", group_size));
            }

            DayItinerary {
                day_number: day,
                date: input
                    .start_date
                    .and_then(|start| start.checked_add_days(Days::new(u64::from(day - 1)))),
                title: format!("Day {}: {} in {}", day, theme, country),
                activities: day_activities(country, theme, budget),
                estimated_cost: Some(daily_estimate(day, budget)),
                notes: Some(notes),
            }
        })
        .collect();

    TravelPlan {
        country: country.to_string(),
        days: input.days,
        title: format!("{}-Day {} Adventure", input.days, country),
        description: Some(format!(
            "A {} {}-day itinerary through {}.",
            budget.label(),
            input.days,
            country
        )),
        itinerary,
        total_estimated_cost: Some(f64::from(budget.daily_budget() * input.days)),
        currency: "USD".to_string(),
        best_time_to_visit: Some(format!("Best time to visit {} varies by season", country)),
        cultural_tips: Some(format!(
            "Learn basic phrases in the local language and respect cultural norms in {}",
            country
        )),
        gemini_generated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fallback_is_deterministic() {
        let input = TravelPlanInput::new("Japan", 9)
            .with_budget(BudgetRange::Luxury)
            .with_preferences([TravelPreference::Food, TravelPreference::Nature]);

        let first = serde_json::to_string(&generate_fallback_plan(&input)).unwrap();
        let second = serde_json::to_string(&generate_fallback_plan(&input)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_itinerary_covers_every_day() {
        let plan = generate_fallback_plan(&TravelPlanInput::new("Japan", 5));

        assert_eq!(plan.itinerary.len(), 5);
        assert!(!plan.gemini_generated);
        assert_eq!(plan.itinerary[0].title, "Day 1: Arrival in Japan");
        assert_eq!(plan.itinerary[4].title, "Day 5: Nature in Japan");
        for (i, day) in plan.itinerary.iter().enumerate() {
            assert_eq!(day.day_number as usize, i + 1);
            assert_eq!(day.activities.len(), 5);
        }
    }

    #[test]
    fn test_theme_clamps_to_last() {
        assert_eq!(day_theme(11, &[]), "Departure");
        assert_eq!(day_theme(12, &[]), "Departure");
        assert_eq!(day_theme(30, &[]), "Departure");
    }

    #[test]
    fn test_preferences_override_leading_days() {
        let preferences = [
            TravelPreference::History,
            TravelPreference::Shopping,
            TravelPreference::Food,
        ];

        assert_eq!(day_theme(1, &preferences), "Historical Discovery");
        // unmapped tag keeps the cycle theme
        assert_eq!(day_theme(2, &preferences), "Cultural Exploration");
        assert_eq!(day_theme(3, &preferences), "Culinary Journey");
        assert_eq!(day_theme(4, &preferences), "Historical Sites");
    }

    #[test]
    fn test_activity_costs_scale_with_budget() {
        let costs = |budget| {
            day_activities("Peru", "Arrival", budget)
                .into_iter()
                .map(|a| a.cost.unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(costs(BudgetRange::Budget), vec![9.0, 15.0, 12.0, 6.0, 21.0]);
        assert_eq!(costs(BudgetRange::Moderate), vec![15.0, 25.0, 20.0, 10.0, 35.0]);
        assert_eq!(costs(BudgetRange::Luxury), vec![30.0, 50.0, 40.0, 20.0, 70.0]);
    }

    #[test]
    fn test_daily_estimate_cycles() {
        assert_eq!(daily_estimate(1, BudgetRange::Moderate), 90.0);
        assert_eq!(daily_estimate(2, BudgetRange::Moderate), 100.0);
        assert_eq!(daily_estimate(3, BudgetRange::Moderate), 80.0);
        assert_eq!(daily_estimate(1, BudgetRange::Budget), 45.0);
        assert_eq!(daily_estimate(2, BudgetRange::Luxury), 200.0);
    }

    #[test]
    fn test_total_cost_ordering() {
        let total = |budget| {
            generate_fallback_plan(&TravelPlanInput::new("Kenya", 6).with_budget(budget))
                .total_estimated_cost
                .unwrap()
        };

        let budget = total(BudgetRange::Budget);
        let moderate = total(BudgetRange::Moderate);
        let luxury = total(BudgetRange::Luxury);

        assert_eq!(budget, 300.0);
        assert!(budget < moderate && moderate < luxury);
    }

    #[test]
    fn test_dates_follow_start_date() {
        let input = TravelPlanInput::new("Norway", 3)
            .with_start_date(NaiveDate::from_ymd_opt(2026, 12, 30).unwrap());
        let plan = generate_fallback_plan(&input);

        let dates: Vec<_> = plan.itinerary.iter().map(|d| d.date.unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 12, 30).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_dates_past_calendar_end_are_left_blank() {
        let input = TravelPlanInput::new("Norway", 3).with_start_date(NaiveDate::MAX);
        let plan = generate_fallback_plan(&input);

        assert_eq!(plan.itinerary.len(), 3);
        assert_eq!(plan.itinerary[0].date, Some(NaiveDate::MAX));
        assert!(plan.itinerary[1].date.is_none());
    }

    #[test]
    fn test_single_day_plan() {
        let plan = generate_fallback_plan(&TravelPlanInput::new("Malta", 1));
        assert_eq!(plan.itinerary.len(), 1);
        assert_eq!(plan.total_estimated_cost, Some(100.0));
    }
}
