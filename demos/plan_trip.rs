use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use trip_planner::{
    BudgetRange, ChatCompletionsClient, DEFAULT_MAX_DAYS, GenerationParams, TravelPlan,
    TravelPlanInput, TravelPlanner, TravelPreference, generate_fallback_plan,
};

// Generates one travel plan from the command line.
//
// Without --live the plan comes straight from the fallback generator, so the
// demo works offline. With --live it calls the completion endpoint configured
// through GEMINI_API_KEY / GEMINI_BASE_URL / GEMINI_MODEL.

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Budget {
    Budget,
    Moderate,
    Luxury,
}

impl From<Budget> for BudgetRange {
    fn from(value: Budget) -> Self {
        match value {
            Budget::Budget => BudgetRange::Budget,
            Budget::Moderate => BudgetRange::Moderate,
            Budget::Luxury => BudgetRange::Luxury,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Interest {
    Culture,
    Food,
    Adventure,
    Nature,
    History,
    Relaxation,
    Shopping,
    Nightlife,
}

impl From<Interest> for TravelPreference {
    fn from(value: Interest) -> Self {
        match value {
            Interest::Culture => TravelPreference::Culture,
            Interest::Food => TravelPreference::Food,
            Interest::Adventure => TravelPreference::Adventure,
            Interest::Nature => TravelPreference::Nature,
            Interest::History => TravelPreference::History,
            Interest::Relaxation => TravelPreference::Relaxation,
            Interest::Shopping => TravelPreference::Shopping,
            Interest::Nightlife => TravelPreference::Nightlife,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "plan_trip", about = "Generate a travel itinerary")]
struct Args {
    /// Destination country
    #[arg(long)]
    country: String,

    /// Number of travel days
    #[arg(long, default_value_t = 5)]
    days: u32,

    #[arg(long, value_enum)]
    budget: Option<Budget>,

    /// May be repeated; order decides which days get themed first
    #[arg(long = "prefer", value_enum)]
    preferences: Vec<Interest>,

    #[arg(long)]
    group_size: Option<u32>,

    /// First day of the trip, YYYY-MM-DD
    #[arg(long)]
    start_date: Option<NaiveDate>,

    #[arg(long)]
    requirements: Option<String>,

    /// Call the completion endpoint instead of generating offline
    #[arg(long)]
    live: bool,

    /// Print the full plan as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn to_input(&self) -> TravelPlanInput {
        let mut input = TravelPlanInput::new(self.country.clone(), self.days)
            .with_preferences(self.preferences.iter().copied().map(TravelPreference::from));
        input.budget_range = self.budget.map(BudgetRange::from);
        input.group_size = self.group_size;
        input.start_date = self.start_date;
        input.additional_requirements = self.requirements.clone();
        input
    }
}

fn live_planner() -> anyhow::Result<TravelPlanner> {
    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY not set")?;
    let base_url = std::env::var("GEMINI_BASE_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta/openai".to_string());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

    let client = ChatCompletionsClient::new(base_url, api_key, model, Duration::from_secs(30))?;
    Ok(TravelPlanner::new(Arc::new(client), GenerationParams::default()))
}

fn print_summary(plan: &TravelPlan) {
    println!("Generated plan: {}", plan.title);
    println!("Destination: {}", plan.country);
    println!("Duration: {} days", plan.days);
    if let Some(total) = plan.total_estimated_cost {
        println!("Estimated cost: {:.2} {}", total, plan.currency);
    }
    if let Some(description) = &plan.description {
        println!("Description: {}", description);
    }
    println!(
        "Source: {}",
        if plan.gemini_generated { "model" } else { "fallback" }
    );
    println!();

    for day in &plan.itinerary {
        match day.estimated_cost {
            Some(cost) => println!("{} ({:.0} {})", day.title, cost, plan.currency),
            None => println!("{}", day.title),
        }
        for activity in &day.activities {
            let time = activity.time.as_deref().unwrap_or("--:--");
            println!("   {}  {}", time, activity.description);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info".into()),
        )
        .init();

    let args = Args::parse();
    let input = args.to_input();
    input.validate(DEFAULT_MAX_DAYS)?;

    let plan = if args.live {
        let generated = live_planner()?.generate(&input).await;
        tracing::info!(provenance = ?generated.provenance, "Plan generated");
        generated.plan
    } else {
        generate_fallback_plan(&input)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_summary(&plan);
    }

    Ok(())
}
