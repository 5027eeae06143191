use healthplanet_client::{
    Config, DateRange, DateType, HealthPlanetClient, http_client::ReqwestHealthPlanetClient,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = std::env::var("HEALTHPLANET_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    // Example: expects HEALTHPLANET_ACCESS_TOKEN in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestHealthPlanetClient::from_config(&cfg, DateType::MeasuredAt)?;
    let result = client.get_body_composition(DateRange::default()).await?;

    println!(
        "born {} / {} cm / {}",
        result.birth_date(),
        result.height(),
        result.sex()
    );
    for item in result.items() {
        println!(
            "{} {} weight={:?} body_fat={:?}",
            item.timestamp(),
            item.model(),
            item.values().weight,
            item.values().body_fat
        );
    }
    Ok(())
}
