use crate::{client::Client, externaltask::LockedExternalTask, worker::builder::FetchSettings};
use futures::stream::{BoxStream, StreamExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};

/// Tracks how many external tasks this worker holds a lock on and issues a
/// new `fetchAndLock` whenever that number falls to the refill mark.
pub(crate) struct TaskPoller {
    pub(crate) client: Client,
    pub(crate) fetch: FetchSettings,
    pub(crate) request_timeout: Duration,
    pub(crate) fetch_in_flight: bool,
    pub(crate) max_tasks: u32,
    pub(crate) task_queue: mpsc::Sender<LockedExternalTask>,
    pub(crate) message_sender: mpsc::Sender<PollMessage>,
    pub(crate) messages: BoxStream<'static, PollMessage>,
    /// locked by this worker and not yet returned by a handler
    pub(crate) locked: u32,
    pub(crate) refill_at: u32,
}

impl fmt::Debug for TaskPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPoller")
            .field("worker_id", &self.fetch.worker_id)
            .field("locked", &self.locked)
            .field("fetch_in_flight", &self.fetch_in_flight)
            .finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PollMessage {
    /// The poll interval elapsed.
    Tick,
    /// A `fetchAndLock` call locked this many tasks for the worker.
    TasksLocked(u32),
    /// A `fetchAndLock` call returned, failed or timed out.
    FetchSettled,
    /// A handler returned for one locked task.
    HandlerFinished,
}

impl TaskPoller {
    pub(crate) fn ready_to_lock(&self) -> bool {
        !self.fetch_in_flight && self.locked <= self.refill_at
    }

    /// Number of tasks to ask the engine for; never zero.
    pub(crate) fn free_slots(&self) -> u32 {
        self.max_tasks.saturating_sub(self.locked).max(1)
    }

    pub(crate) fn handle(&mut self, message: PollMessage) {
        match message {
            PollMessage::Tick => self.on_tick(),
            PollMessage::TasksLocked(count) => {
                self.locked = self.locked.saturating_add(count);
            }
            PollMessage::HandlerFinished => {
                self.locked = self.locked.saturating_sub(1);
            }
            PollMessage::FetchSettled => self.fetch_in_flight = false,
        }
    }

    fn on_tick(&mut self) {
        if !self.ready_to_lock() {
            tracing::trace!(
                worker = %self.fetch.worker_id,
                locked = self.locked,
                fetch_in_flight = self.fetch_in_flight,
                "skipping fetchAndLock"
            );
            return;
        }

        let mut fetch = self.fetch.clone();
        fetch.max_tasks = self.free_slots();
        self.fetch_in_flight = true;
        tokio::spawn(lock_and_enqueue(
            self.client.clone(),
            fetch,
            self.request_timeout,
            self.task_queue.clone(),
            self.message_sender.clone(),
        ));
    }
}

/// Runs one `fetchAndLock` and hands every locked task to the dispatcher.
/// Always ends with [`PollMessage::FetchSettled`].
pub(crate) async fn lock_and_enqueue(
    client: Client,
    fetch: FetchSettings,
    request_timeout: Duration,
    task_queue: mpsc::Sender<LockedExternalTask>,
    poll_queue: mpsc::Sender<PollMessage>,
) {
    let worker = fetch.worker_id.clone();
    tracing::trace!(worker = %worker, max_tasks = fetch.max_tasks, "locking external tasks");

    match timeout(request_timeout, fetch.fetch(&client)).await {
        Ok(Ok(tasks)) => {
            let count = tasks.len() as u32;
            tracing::trace!(worker = %worker, count, "locked external tasks");
            // counted before dispatch so no HandlerFinished can overtake it
            if let Err(err) = poll_queue.send(PollMessage::TasksLocked(count)).await {
                tracing::error!(worker = %worker, ?err, "poll queue closed");
            }
            for task in tasks {
                if task_queue.send(task).await.is_err() {
                    tracing::error!(worker = %worker, "task queue closed, dropping locked task");
                    break;
                }
            }
        }
        Ok(Err(err)) => tracing::error!(worker = %worker, %err, "fetchAndLock failed"),
        Err(_) => tracing::warn!(worker = %worker, ?request_timeout, "fetchAndLock timed out"),
    }

    if let Err(err) = poll_queue.send(PollMessage::FetchSettled).await {
        tracing::error!(worker = %worker, ?err, "poll queue closed");
    }
}

impl Future for TaskPoller {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        while let Some(message) = futures::ready!(self.messages.poll_next_unpin(cx)) {
            self.handle(message);
        }
        Poll::Ready(())
    }
}
