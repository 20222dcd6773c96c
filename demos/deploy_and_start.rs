use camunda::{Client, DefinitionRef, ProcessDefinitionQuery, Variable};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    tracing::info!("Deploying process");

    let deployment = client
        .create_deployment("invoice")
        .with_duplicate_filtering(true)
        .with_resource_file("demos/processes/invoice.bpmn")
        .send()
        .await?;
    for definition in deployment.process_definitions() {
        tracing::info!(id = %definition.id, version = definition.version, "deployed");
    }

    let definitions = client
        .get_process_definition_list(
            ProcessDefinitionQuery::new()
                .with_key("invoice")
                .latest_version(),
        )
        .send()
        .await?;
    tracing::info!(count = definitions.len(), "latest invoice definitions");

    tracing::info!("Starting process instance");

    let started = client
        .start_process_instance(DefinitionRef::key("invoice"))
        .with_business_key("INV-1001")
        .with_variable("amount", Variable::long(300))
        .with_variable("creditor", Variable::string("Great Pizza for Everyone Inc."))
        .send()
        .await?;
    println!("started process instance {}", started.instance.id);

    Ok(())
}
