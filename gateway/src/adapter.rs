//! RPC client adapter
//!
//! Upstream clients report completion through a callback handle
//! ([`Completion`]) carrying `(error, response)`. The adapter turns that
//! push-style notification into one awaited `Result`.
//!
//! ## Settlement rules
//!
//! - The first `complete`/`succeed`/`fail` on a `Completion` or any of its
//!   clones settles the call. Everything after that is ignored.
//! - `(Some(err), _)` fails with `err`, `(None, Some(resp))` succeeds,
//!   `(None, None)` fails with [`RpcError::EmptyResponse`].
//! - A completion dropped without firing fails with [`RpcError::Dropped`].
//! - When the waiting side goes away (deadline hit, HTTP request dropped),
//!   [`Completion::closed`] resolves so the client can abandon the call.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use error::RpcError;
use tokio::sync::{oneshot, watch};

use crate::model::ResponsePayload;

type Outcome = Result<ResponsePayload, RpcError>;

/// Upstream operations the gateway can invoke
///
/// Every operation sends an empty request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    NewsBulk,
    FreshNews,
    DbNews,
    NewsStream,
    Products,
    ProductStream,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::NewsBulk,
        Operation::FreshNews,
        Operation::DbNews,
        Operation::NewsStream,
        Operation::Products,
        Operation::ProductStream,
    ];

    /// Short name used in logs and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Operation::NewsBulk => "news",
            Operation::FreshNews => "fresh-news",
            Operation::DbNews => "db-news",
            Operation::NewsStream => "news-stream",
            Operation::Products => "products",
            Operation::ProductStream => "product-stream",
        }
    }

    /// Fully qualified gRPC method path
    pub fn method_path(&self) -> &'static str {
        match self {
            Operation::NewsBulk => "/news.Newservice/GetNewsBulk",
            Operation::FreshNews => "/news.Newservice/GetFreshNews",
            Operation::DbNews => "/news.Newservice/GetDBNews",
            Operation::NewsStream => "/news.Newservice/GetNewsStream",
            Operation::Products => "/product.ProductService/GetProduct",
            Operation::ProductStream => "/product.ProductService/GetProductStream",
        }
    }

    /// Server-streaming methods are collected into a single payload
    pub fn is_streaming(&self) -> bool {
        matches!(self, Operation::NewsStream | Operation::ProductStream)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("unknown operation: {}", s))
    }
}

/// Callback handle given to an upstream client for one call
#[derive(Clone)]
pub struct Completion {
    operation: Operation,
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
    waiter: watch::Receiver<()>,
}

impl Completion {
    /// Operation this completion belongs to
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Callback-style completion with mutually exclusive error and response.
    ///
    /// Returns `true` if this invocation settled the call.
    pub fn complete(&self, error: Option<RpcError>, response: Option<ResponsePayload>) -> bool {
        let outcome = match (error, response) {
            (Some(err), _) => Err(err),
            (None, Some(response)) => Ok(response),
            (None, None) => Err(RpcError::EmptyResponse),
        };
        self.settle(outcome)
    }

    pub fn succeed(&self, response: ResponsePayload) -> bool {
        self.settle(Ok(response))
    }

    pub fn fail(&self, error: RpcError) -> bool {
        self.settle(Err(error))
    }

    /// Whether the call has already been settled
    pub fn is_settled(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Resolves once nobody is waiting for the result anymore.
    pub async fn closed(&self) {
        let mut waiter = self.waiter.clone();
        // The sender never publishes a value; `changed` only returns once it is dropped.
        while waiter.changed().await.is_ok() {}
    }

    fn settle(&self, outcome: Outcome) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(sender) => {
                if sender.send(outcome).is_err() {
                    tracing::debug!("{} settled after the caller stopped waiting", self.operation);
                }
                true
            }
            None => {
                tracing::warn!("{} completed more than once; ignoring", self.operation);
                false
            }
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("operation", &self.operation)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Waiting side of a call
#[derive(Debug)]
pub struct Pending {
    rx: oneshot::Receiver<Outcome>,
    // Dropping this wakes `Completion::closed`.
    _waiting: watch::Sender<()>,
}

impl Pending {
    /// Wait for the call to settle
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(RpcError::Dropped))
    }

    /// Wait for the call to settle, giving up after `deadline`
    pub async fn wait_for(self, deadline: Option<Duration>) -> Outcome {
        match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, self.wait()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RpcError::DeadlineExceeded(deadline)),
            },
            None => self.wait().await,
        }
    }
}

/// Create a linked completion handle and waiter for one call
pub fn bridge(operation: Operation) -> (Completion, Pending) {
    let (tx, rx) = oneshot::channel();
    let (waiting_tx, waiting_rx) = watch::channel(());

    let completion = Completion {
        operation,
        slot: Arc::new(Mutex::new(Some(tx))),
        waiter: waiting_rx,
    };
    let pending = Pending {
        rx,
        _waiting: waiting_tx,
    };

    (completion, pending)
}

/// Callback-style upstream RPC client
///
/// `invoke` must return without blocking and eventually settle `completion`
/// (or drop it).
pub trait UpstreamClient: Send + Sync {
    fn invoke(&self, operation: Operation, completion: Completion);
}

/// Awaitable front for an [`UpstreamClient`]
#[derive(Clone)]
pub struct RpcAdapter {
    client: Arc<dyn UpstreamClient>,
    deadline: Option<Duration>,
}

impl RpcAdapter {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            client,
            deadline: None,
        }
    }

    /// Bound every call by `deadline` (`None` waits forever)
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Invoke `operation` upstream and wait for its result
    pub async fn call(&self, operation: Operation) -> Result<ResponsePayload, RpcError> {
        let (completion, pending) = bridge(operation);

        tracing::debug!("Calling {} ({})", operation, operation.method_path());
        self.client.invoke(operation, completion);

        let outcome = pending.wait_for(self.deadline).await;
        match &outcome {
            Ok(payload) => tracing::debug!("{} returned {} items", operation, payload.len()),
            Err(e) => tracing::debug!("{} failed: {}", operation, e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsItem;

    /// Settles synchronously from inside `invoke` with a fixed callback sequence
    struct ScriptedClient {
        calls: Vec<(Option<RpcError>, Option<ResponsePayload>)>,
    }

    impl UpstreamClient for ScriptedClient {
        fn invoke(&self, _operation: Operation, completion: Completion) {
            for (error, response) in self.calls.clone() {
                completion.complete(error, response);
            }
        }
    }

    struct SilentClient;

    impl UpstreamClient for SilentClient {
        fn invoke(&self, _operation: Operation, completion: Completion) {
            tokio::spawn(async move {
                completion.closed().await;
            });
        }
    }

    struct DroppingClient;

    impl UpstreamClient for DroppingClient {
        fn invoke(&self, _operation: Operation, completion: Completion) {
            drop(completion);
        }
    }

    fn adapter(client: impl UpstreamClient + 'static) -> RpcAdapter {
        RpcAdapter::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_response_without_error_succeeds() {
        let adapter = adapter(ScriptedClient {
            calls: vec![(None, Some(ResponsePayload::news(vec![])))],
        });

        let result = adapter.call(Operation::FreshNews).await;
        assert_eq!(result, Ok(ResponsePayload::news(vec![])));
    }

    #[tokio::test]
    async fn test_error_without_response_fails() {
        let err = RpcError::status(tonic::Code::Unavailable, "upstream down");
        let adapter = adapter(ScriptedClient {
            calls: vec![(Some(err.clone()), None)],
        });

        let result = adapter.call(Operation::DbNews).await;
        assert_eq!(result, Err(err));
    }

    #[tokio::test]
    async fn test_second_callback_is_ignored() {
        let adapter = adapter(ScriptedClient {
            calls: vec![
                (None, Some(ResponsePayload::news(vec![NewsItem::default()]))),
                (Some(RpcError::Transport("late".to_string())), None),
                (None, Some(ResponsePayload::products(vec![]))),
            ],
        });

        let result = adapter.call(Operation::NewsBulk).await.unwrap();
        assert_eq!(result, ResponsePayload::news(vec![NewsItem::default()]));
    }

    #[tokio::test]
    async fn test_complete_reports_first_settlement_only() {
        let (completion, pending) = bridge(Operation::Products);
        let clone = completion.clone();

        assert!(!completion.is_settled());
        assert!(clone.fail(RpcError::EmptyResponse));
        assert!(completion.is_settled());
        assert!(!completion.succeed(ResponsePayload::products(vec![])));

        assert_eq!(pending.wait().await, Err(RpcError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_neither_error_nor_response() {
        let adapter = adapter(ScriptedClient {
            calls: vec![(None, None)],
        });
        assert_eq!(
            adapter.call(Operation::Products).await,
            Err(RpcError::EmptyResponse)
        );
    }

    #[tokio::test]
    async fn test_dropped_completion_fails() {
        let adapter = adapter(DroppingClient);
        assert_eq!(adapter.call(Operation::NewsBulk).await, Err(RpcError::Dropped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let deadline = Duration::from_secs(5);
        let adapter = adapter(SilentClient).with_deadline(Some(deadline));

        let result = adapter.call(Operation::NewsStream).await;
        assert_eq!(result, Err(RpcError::DeadlineExceeded(deadline)));
    }

    #[tokio::test]
    async fn test_closed_resolves_when_waiter_dropped() {
        let (completion, pending) = bridge(Operation::FreshNews);
        let watcher = tokio::spawn({
            let completion = completion.clone();
            async move { completion.closed().await }
        });

        drop(pending);
        watcher.await.unwrap();
        assert!(completion.succeed(ResponsePayload::news(vec![])));
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>(), Ok(op));
        }
        assert!("weather".parse::<Operation>().is_err());
        assert!(Operation::ProductStream.is_streaming());
        assert!(!Operation::DbNews.is_streaming());
    }
}
