use camunda::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
enum ApprovalError {
    #[error("invoice of {0} exceeds the approval limit")]
    LimitExceeded(i64),
}

// Read from the task variables of the same name
#[derive(Deserialize)]
struct Invoice {
    amount: i64,
    creditor: String,
}

// Written back as process variables when the task is completed
#[derive(Serialize)]
struct Approval {
    approved: bool,
    approver: String,
}

async fn approve(_client: Client, invoice: Invoice) -> Result<Approval, ApprovalError> {
    if invoice.amount > 10_000 {
        return Err(ApprovalError::LimitExceeded(invoice.amount));
    }

    Ok(Approval {
        approved: true,
        approver: format!("auto-approval for {}", invoice.creditor),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let client = Client::from_env()?;

    client
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_worker_id("auto-approver")
        .with_auto_handler(approve)
        .run()
        .await?;

    Ok(())
}
