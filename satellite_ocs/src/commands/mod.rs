pub mod handler;

pub use handler::CommandDispatcher;

use shared_protocol::Receiver;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on one blocking receive, so cancellation is noticed promptly.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// How long `stop` waits for the listener task to finish.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to the running uplink listener task.
pub struct CommandListener {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub fn spawn_receiver(rx: Receiver, dispatcher: CommandDispatcher) -> CommandListener {
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    got = rx.recv(POLL_INTERVAL) => {
                        if let Some((datagram, from)) = got {
                            dispatcher.dispatch(&datagram, from);
                        }
                    }
                }
            }
            debug!("command listener loop exited");
            // rx dropped here; socket released
        }
    });
    CommandListener { cancel, task }
}

impl CommandListener {
    pub async fn stop(self) {
        self.cancel.cancel();
        match tokio::time::timeout(STOP_TIMEOUT, self.task).await {
            Ok(Ok(())) => info!("command listener stopped"),
            Ok(Err(e)) => warn!(?e, "command listener task failed"),
            Err(_) => warn!(timeout = ?STOP_TIMEOUT, "command listener did not stop in time"),
        }
    }
}
