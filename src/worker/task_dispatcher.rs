use crate::{
    client::Client,
    externaltask::LockedExternalTask,
    worker::{builder::TaskHandler, PollMessage},
};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing_futures::Instrument;

pub(crate) async fn run(
    mut task_queue: mpsc::Receiver<LockedExternalTask>,
    poll_queue: mpsc::Sender<PollMessage>,
    concurrency: usize,
    handler: TaskHandler,
    client: Client,
    worker: String,
) {
    let concurrent_tasks = Arc::new(Semaphore::new(concurrency));

    while let Some(task) = task_queue.recv().await {
        let task_slot = match concurrent_tasks.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let dispatch = DispatchedTask {
            task,
            client: client.clone(),
            poll_queue: poll_queue.clone(),
            handler: handler.clone(),
        };
        let span = tracing::debug_span!(
            "external_task",
            worker = %worker,
            topic = %dispatch.task.topic_name,
            task = %dispatch.task.id,
        );

        tokio::spawn(
            async move {
                tracing::trace!(task = ?dispatch.task, "dispatching task");
                dispatch.handler.call(dispatch.client, dispatch.task).await;

                tracing::trace!("task handled");
                let _ = dispatch.poll_queue.send(PollMessage::HandlerFinished).await;
                drop(task_slot);
            }
            .instrument(span),
        );
    }
}

struct DispatchedTask {
    task: LockedExternalTask,
    client: Client,
    poll_queue: mpsc::Sender<PollMessage>,
    handler: TaskHandler,
}
