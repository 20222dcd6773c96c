use camunda::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Configured by CAMUNDA_BASE_URL, CAMUNDA_ENGINE, CAMUNDA_USERNAME, ...
    let client = Client::from_env()?;

    let version = client.get_version().send().await?;
    println!("REST API version: {}", version.version);

    for engine in client.get_engine_names().send().await? {
        println!("process engine: {}", engine);
    }

    Ok(())
}
