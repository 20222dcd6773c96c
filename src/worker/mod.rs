mod builder;
mod task_dispatcher;
mod task_poller;

pub use builder::ExternalTaskWorkerBuilder;
pub(crate) use task_poller::{PollMessage, TaskPoller};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{worker::builder::FetchSettings, Client, FetchTopic};
    use futures::{stream, StreamExt};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn settings() -> FetchSettings {
        FetchSettings {
            worker_id: "w".to_owned(),
            topic: FetchTopic::new("t", Duration::from_secs(1)),
            max_tasks: 10,
            use_priority: false,
            long_poll_timeout: None,
        }
    }

    fn poller(messages: Vec<PollMessage>, locked: u32, refill_at: u32) -> TaskPoller {
        let (task_queue, _) = mpsc::channel(1);
        let (message_sender, _) = mpsc::channel(1);
        TaskPoller {
            client: Client::default(),
            fetch: settings(),
            request_timeout: Duration::from_secs(1),
            fetch_in_flight: false,
            max_tasks: 10,
            task_queue,
            message_sender,
            messages: stream::iter(messages).boxed(),
            locked,
            refill_at,
        }
    }

    #[tokio::test]
    async fn poller_counts_locked_tasks_until_handlers_finish() {
        let mut poller = poller(
            vec![
                PollMessage::TasksLocked(5),
                PollMessage::HandlerFinished,
                PollMessage::HandlerFinished,
            ],
            0,
            3,
        );
        (&mut poller).await;
        assert_eq!(poller.locked, 3);
        assert!(poller.ready_to_lock());
        assert_eq!(poller.free_slots(), 7);
    }

    #[tokio::test]
    async fn tick_is_ignored_while_enough_tasks_are_locked() {
        let mut poller = poller(vec![PollMessage::Tick], 8, 3);
        (&mut poller).await;
        assert!(!poller.fetch_in_flight);
        assert!(!poller.ready_to_lock());
    }

    #[tokio::test]
    async fn only_one_fetch_is_in_flight_until_it_settles() {
        let mut poller = poller(vec![], 0, 3);
        poller.fetch_in_flight = true;
        poller.handle(PollMessage::Tick);
        assert!(poller.fetch_in_flight);
        assert!(!poller.ready_to_lock());

        poller.handle(PollMessage::FetchSettled);
        assert!(poller.ready_to_lock());
    }

    #[test]
    fn free_slots_never_asks_for_zero_tasks() {
        let poller = poller(vec![], 12, 3);
        assert_eq!(poller.free_slots(), 1);
    }

    #[tokio::test]
    async fn timed_out_fetch_still_settles() {
        let (task_queue, mut tasks) = mpsc::channel(1);
        let (poll_queue, mut messages) = mpsc::channel(4);

        task_poller::lock_and_enqueue(
            Client::default(),
            settings(),
            Duration::ZERO,
            task_queue,
            poll_queue,
        )
        .await;

        assert_eq!(messages.recv().await, Some(PollMessage::FetchSettled));
        assert!(tasks.try_recv().is_err());
    }
}
