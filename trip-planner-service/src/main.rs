use tokio::net::TcpListener;
use tracing::{error, info};
use trip_planner_service::{Settings, create_app, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is read here, before the subscriber looks at RUST_LOG
    let settings = Settings::from_env();
    init_tracing(
        settings
            .as_ref()
            .map(|settings| settings.log_format)
            .unwrap_or_default(),
    );

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app = create_app(&settings)?;
    let listener = TcpListener::bind(settings.bind_address()).await?;
    let addr = listener.local_addr()?;

    info!("{} starting on {}", settings.project_name, addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!(
        "Generation endpoint: POST http://{}{}/generate_plan",
        addr, settings.api_v1_str
    );

    axum::serve(listener, app).await?;

    Ok(())
}
