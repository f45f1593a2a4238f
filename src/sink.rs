use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

/// What gets logged for every accepted pull request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub action: String,
    pub pull_request_url: Option<String>,
}

/// Destination for accepted events. Implementations must not block the request handler.
pub trait EventSink: Send + Sync {
    fn emit(&self, record: PullRequestRecord);
}

pub struct EventSender(pub UnboundedSender<PullRequestRecord>);

impl EventSink for EventSender {
    fn emit(&self, record: PullRequestRecord) {
        if let Err(e) = self.0.send(record) {
            warn!("event log channel was closed, dropping record {:?}", e.0);
        }
    }
}

/// Drains the channel and writes every record to the log.
///
/// Returns once all [`EventSender`]s have been dropped.
pub async fn log_events(mut events: UnboundedReceiver<PullRequestRecord>) {
    while let Some(record) = events.recv().await {
        info!(
            action = %record.action,
            pull_request_url = record.pull_request_url.as_deref().unwrap_or("none"),
            "PR event received"
        );
    }

    info!("all channel senders were dropped, exiting log loop");
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    #[test]
    fn test_sender_forwards_records() {
        let (sender, mut receiver) = unbounded_channel();
        let sink = EventSender(sender);

        let record = PullRequestRecord {
            action: "opened".to_string(),
            pull_request_url: None,
        };
        sink.emit(record.clone());

        assert_eq!(receiver.try_recv().unwrap(), record);
    }

    #[test]
    fn test_closed_channel_doesnt_panic() {
        let (sender, receiver) = unbounded_channel();
        drop(receiver);

        EventSender(sender).emit(PullRequestRecord {
            action: "closed".to_string(),
            pull_request_url: None,
        });
    }

    #[tokio::test]
    async fn test_log_loop_exits_when_senders_dropped() {
        let (sender, receiver) = unbounded_channel();
        let sink = EventSender(sender);
        sink.emit(PullRequestRecord {
            action: "opened".to_string(),
            pull_request_url: Some("https://example.com/pr/1".to_string()),
        });
        drop(sink);

        log_events(receiver).await;
    }
}
