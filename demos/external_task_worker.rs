use camunda::{Client, LockedExternalTask, Variable};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    tracing::info!("Launching worker");

    client
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_worker_id("invoice-worker")
        .with_lock_duration(Duration::from_secs(60))
        .with_variables(vec!["amount".to_owned()])
        .with_concurrency(2)
        .with_handler(handle_task)
        .run()
        .await?;

    Ok(())
}

async fn handle_task(client: Client, task: LockedExternalTask) {
    let amount = match task.variable::<i64>("amount") {
        Some(Ok(amount)) => amount,
        _ => {
            let _ = client
                .handle_external_task_failure(&task.id, task.worker_id.clone())
                .with_error_message("missing amount")
                .with_retries(0)
                .send()
                .await;
            return;
        }
    };

    tracing::info!(task = %task.id, amount, "approving invoice");

    let _ = client
        .complete_external_task(&task.id, task.worker_id.clone())
        .with_variable("approved", Variable::boolean(amount <= 1000))
        .send()
        .await;
}
