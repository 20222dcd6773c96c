use camunda::{Client, SortOrder, TaskQuery, TaskSortKey, Variable};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;
    let user = std::env::var("CAMUNDA_USERNAME").unwrap_or_else(|_| "demo".to_owned());

    let query = TaskQuery::new()
        .with_candidate_group("accounting")
        .with_task_definition_key("review-invoice")
        .unassigned();
    let open = client.count_tasks(query.clone()).send().await?;
    tracing::info!(open, "unassigned review tasks");

    let tasks = client
        .get_task_list(query)
        .with_sort_by(TaskSortKey::Created, SortOrder::Asc)
        .with_max_results(10)
        .send()
        .await?;

    for task in tasks {
        client.claim_task(&task.id, user.as_str()).send().await?;

        let form = client.get_task_form_variables(&task.id).send().await?;
        let amount = form
            .get("amount")
            .and_then(|variable| variable.value_as::<i64>().ok())
            .unwrap_or_default();
        println!("{} ({}): amount {}", task.id, task.name.unwrap_or_default(), amount);

        client
            .complete_task(&task.id)
            .with_variable("reviewed", Variable::boolean(true))
            .send()
            .await?;
    }

    Ok(())
}
