use crate::client::Client;
use crate::error::{Error, Result};
use crate::externaltask::{FetchTopic, LockedExternalTask, LONG_POLL_TIMEOUT_OFFSET};
use crate::variable::{from_variables, to_variables};
use crate::worker::{task_dispatcher, PollMessage, TaskPoller};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::mpsc, time::interval};
use tokio_stream::{
    wrappers::{IntervalStream, ReceiverStream},
    StreamExt,
};
use tracing_futures::Instrument;

static DEFAULT_LOCK_DURATION: Duration = Duration::from_secs(5 * 60);
static DEFAULT_WORKER_MAX_TASKS: u32 = 32;
static DEFAULT_WORKER_CONCURRENCY: u32 = 4;
static DEFAULT_WORKER_POLL_INTERVAL: Duration = Duration::from_millis(100);
static DEFAULT_WORKER_POLL_THRESHOLD: f32 = 0.3;
static DEFAULT_LONG_POLL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub(crate) struct TaskHandler(
    Arc<dyn Fn(Client, LockedExternalTask) -> BoxFuture<'static, ()> + Send + Sync>,
);

impl TaskHandler {
    pub(crate) fn call(&self, client: Client, task: LockedExternalTask) -> BoxFuture<'static, ()> {
        self.0(client, task)
    }
}

impl fmt::Debug for TaskHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TaskHandler")
    }
}

/// Settings of the fetch and lock requests a worker sends.
#[derive(Clone, Debug)]
pub(crate) struct FetchSettings {
    pub(crate) worker_id: String,
    pub(crate) topic: FetchTopic,
    pub(crate) max_tasks: u32,
    pub(crate) use_priority: bool,
    pub(crate) long_poll_timeout: Option<Duration>,
}

impl FetchSettings {
    pub(crate) async fn fetch(self, client: &Client) -> Result<Vec<LockedExternalTask>> {
        let mut request = client
            .fetch_and_lock(self.worker_id)
            .with_max_tasks(self.max_tasks)
            .with_use_priority(self.use_priority)
            .with_topic(self.topic);
        if let Some(timeout) = self.long_poll_timeout {
            request = request.with_async_response_timeout(timeout);
        }
        request.send().await
    }
}

impl Client {
    /// Create an external task worker.
    pub fn external_task_worker(&self) -> ExternalTaskWorkerBuilder {
        ExternalTaskWorkerBuilder::new(self.clone())
    }
}

/// Configuration for a polling external task worker.
///
/// The worker fetches and locks tasks of a single topic, hands each one to the
/// handler and keeps at most `concurrency` handlers running. New tasks are
/// fetched once the number of unfinished tasks drops to the poll threshold.
#[derive(Debug)]
pub struct ExternalTaskWorkerBuilder {
    client: Client,
    handler: Option<TaskHandler>,
    topic_name: String,
    lock_duration: Option<Duration>,
    variables: Option<Vec<String>>,
    concurrency: u32,
    poll_interval: Duration,
    poll_threshold: f32,
    fetch: FetchSettings,
}

impl ExternalTaskWorkerBuilder {
    /// Create a new external task worker builder.
    pub fn new(client: Client) -> Self {
        ExternalTaskWorkerBuilder {
            client,
            handler: None,
            topic_name: String::new(),
            lock_duration: None,
            variables: None,
            concurrency: DEFAULT_WORKER_CONCURRENCY,
            poll_interval: DEFAULT_WORKER_POLL_INTERVAL,
            poll_threshold: DEFAULT_WORKER_POLL_THRESHOLD,
            fetch: FetchSettings {
                worker_id: String::from("default"),
                topic: FetchTopic::new("", DEFAULT_LOCK_DURATION),
                max_tasks: DEFAULT_WORKER_MAX_TASKS,
                use_priority: false,
                long_poll_timeout: Some(DEFAULT_LONG_POLL_TIMEOUT),
            },
        }
    }

    /// Set the topic the worker fetches tasks from.
    pub fn with_topic<T: Into<String>>(mut self, topic_name: T) -> Self {
        self.topic_name = topic_name.into();
        self
    }

    /// Set a fully configured topic, including its lock duration and filters.
    pub fn with_fetch_topic(mut self, topic: FetchTopic) -> Self {
        self.topic_name = topic.topic_name().to_owned();
        self.fetch.topic = topic;
        self
    }

    /// Set the id the worker locks tasks with.
    pub fn with_worker_id<T: Into<String>>(mut self, worker_id: T) -> Self {
        self.fetch.worker_id = worker_id.into();
        self
    }

    /// Set how long fetched tasks stay locked for the worker.
    ///
    /// Overrides the lock duration of a topic set with
    /// [`with_fetch_topic`](Self::with_fetch_topic), whichever is called first.
    pub fn with_lock_duration(self, lock_duration: Duration) -> Self {
        ExternalTaskWorkerBuilder {
            lock_duration: Some(lock_duration),
            ..self
        }
    }

    /// Only fetch the named variables; all variables are fetched by default.
    pub fn with_variables(self, variables: Vec<String>) -> Self {
        ExternalTaskWorkerBuilder {
            variables: Some(variables),
            ..self
        }
    }

    /// Set the maximum number of locked tasks the worker holds at a time.
    pub fn with_max_tasks(mut self, max_tasks: u32) -> Self {
        self.fetch.max_tasks = max_tasks;
        self
    }

    /// Fetch tasks with a higher priority first.
    pub fn with_use_priority(mut self, use_priority: bool) -> Self {
        self.fetch.use_priority = use_priority;
        self
    }

    /// Set how long the engine holds a fetch request open while no tasks are
    /// available; `None` disables long polling.
    ///
    /// Fetch requests wait for the long-poll timeout plus a grace period,
    /// regardless of the client request timeout.
    pub fn with_long_poll_timeout(mut self, long_poll_timeout: Option<Duration>) -> Self {
        self.fetch.long_poll_timeout = long_poll_timeout;
        self
    }

    /// Set the max number of tasks to handle concurrently.
    pub fn with_concurrency(self, concurrency: u32) -> Self {
        ExternalTaskWorkerBuilder {
            concurrency,
            ..self
        }
    }

    /// Set how often the worker checks whether to fetch more tasks.
    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        ExternalTaskWorkerBuilder {
            poll_interval,
            ..self
        }
    }

    /// Set the fraction of `max_tasks` that unfinished tasks must drop to
    /// before more tasks are fetched.
    pub fn with_poll_threshold(self, poll_threshold: f32) -> Self {
        ExternalTaskWorkerBuilder {
            poll_threshold,
            ..self
        }
    }

    /// Set the handler function for the worker.
    ///
    /// The handler is responsible for completing the task or reporting a
    /// failure through the client.
    pub fn with_handler<T, R>(self, handler: T) -> Self
    where
        T: Fn(Client, LockedExternalTask) -> R + Send + Sync + 'static,
        R: Future<Output = ()> + Send + 'static,
    {
        ExternalTaskWorkerBuilder {
            handler: Some(TaskHandler(Arc::new(move |client, task| {
                Box::pin(handler(client, task))
            }))),
            ..self
        }
    }

    /// Set a handler function that completes or fails the task based on the
    /// result rather than having to explicitly use the client to report the
    /// task status.
    ///
    /// The task variables are deserialized into the handler input, field by
    /// variable name. On success the serialized output fields are set as
    /// process variables when completing the task. On error, or when the
    /// variables do not match the input type, a failure with the error
    /// message and no retries left is reported, which raises an incident.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde::{Deserialize, Serialize};
    /// use camunda::Client;
    ///
    /// #[derive(Deserialize)]
    /// struct Invoice {
    ///     amount: u32,
    /// }
    ///
    /// #[derive(Serialize)]
    /// struct Approval {
    ///     approved: bool,
    /// }
    ///
    /// async fn approve(_client: Client, invoice: Invoice) -> Result<Approval, std::io::Error> {
    ///     Ok(Approval { approved: invoice.amount < 1000 })
    /// }
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::default();
    ///
    /// client
    ///     .external_task_worker()
    ///     .with_topic("approve-invoice")
    ///     .with_auto_handler(approve)
    ///     .run()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_auto_handler<F, T, R, O, E>(self, handler: F) -> Self
    where
        F: Fn(Client, T) -> R + Send + Sync + 'static,
        T: DeserializeOwned,
        R: Future<Output = std::result::Result<O, E>> + Send + 'static,
        O: Serialize,
        E: fmt::Display,
    {
        self.with_handler(move |client, task| {
            let span = tracing::info_span!(
                "auto_handler",
                topic = %task.topic_name,
                task = %task.id,
                instance = ?task.process_instance_id,
            );
            let worker_id = task.worker_id.clone();
            match from_variables::<T>(&task.variables) {
                Ok(input) => handler(client.clone(), input)
                    .then(move |result| {
                        let report = match result {
                            Ok(output) => to_variables(&output).map_err(|err| err.to_string()),
                            Err(err) => Err(err.to_string()),
                        };
                        async move {
                            let outcome = match report {
                                Ok(variables) => {
                                    client
                                        .complete_external_task(&task.id, worker_id)
                                        .with_variables(variables)
                                        .send()
                                        .await
                                }
                                Err(message) => {
                                    report_failure(&client, &task, worker_id, message).await
                                }
                            };
                            if let Err(err) = outcome {
                                tracing::error!(%err, "failed to report task outcome");
                            }
                        }
                    })
                    .instrument(span)
                    .boxed(),
                Err(err) => {
                    span.in_scope(|| {
                        tracing::error!(%err, "variables do not deserialize to expected type");
                    });
                    async move {
                        let message =
                            format!("variables do not deserialize to expected type: {}", err);
                        if let Err(err) = report_failure(&client, &task, worker_id, message).await {
                            tracing::error!(%err, "failed to report task failure");
                        }
                    }
                    .instrument(span)
                    .boxed()
                }
            }
        })
    }

    /// Start the worker as a future. To stop the worker, simply drop the future.
    pub async fn run(mut self) -> Result<()> {
        if self.topic_name.is_empty() {
            return Err(Error::InvalidParameters("`topic` and `handler` must be set"));
        }
        let handler = self
            .handler
            .take()
            .ok_or(Error::InvalidParameters("`topic` and `handler` must be set"))?;

        let mut fetch = self.fetch;
        if fetch.topic.topic_name() != self.topic_name {
            fetch.topic = FetchTopic::new(self.topic_name.clone(), DEFAULT_LOCK_DURATION);
        }
        if let Some(lock_duration) = self.lock_duration {
            fetch.topic = fetch.topic.with_lock_duration(lock_duration);
        }
        if let Some(variables) = self.variables {
            fetch.topic = fetch.topic.with_variables(variables);
        }

        let (task_queue, task_queue_rx) = mpsc::channel(fetch.max_tasks.max(1) as usize);
        let (poll_queue, poll_rx) = mpsc::channel(32);
        let poll_interval =
            IntervalStream::new(interval(self.poll_interval)).map(|_| PollMessage::Tick);
        let worker_id = fetch.worker_id.clone();
        // outlives the HTTP timeout of the fetch itself
        let request_timeout =
            fetch.long_poll_timeout.unwrap_or_default() + 2 * LONG_POLL_TIMEOUT_OFFSET;
        let task_poller = TaskPoller {
            client: self.client.clone(),
            request_timeout,
            fetch_in_flight: false,
            max_tasks: fetch.max_tasks,
            task_queue,
            message_sender: poll_queue.clone(),
            messages: Box::pin(futures::stream::select(
                ReceiverStream::new(poll_rx),
                poll_interval,
            )),
            locked: 0,
            refill_at: (fetch.max_tasks as f32 * self.poll_threshold).floor() as u32,
            fetch,
        };

        tracing::info!(worker_id = %worker_id, topic = %self.topic_name, "starting external task worker");
        futures::join!(
            task_poller,
            task_dispatcher::run(
                task_queue_rx,
                poll_queue,
                self.concurrency.max(1) as usize,
                handler,
                self.client.clone(),
                worker_id,
            )
        );

        Ok(())
    }
}

async fn report_failure(
    client: &Client,
    task: &LockedExternalTask,
    worker_id: String,
    message: String,
) -> Result<()> {
    client
        .handle_external_task_failure(&task.id, worker_id)
        .with_error_message(message)
        .with_retries(0)
        .send()
        .await
}
