pub mod config;
pub mod logging;

pub mod batch;
pub mod connection;
pub mod control;
pub mod executor;
pub mod observer;
pub mod retry;
pub mod status;
pub mod workload;

pub use batch::{BatchRerunPolicy, BatchResult, BatchRunner};
pub use connection::{ConnectionError, ConnectionProvider, QueryHandle};
pub use control::CancelToken;
pub use executor::{ExecutionOutcome, ExecutionReport, QueryExecutor};
pub use observer::{NoopObserver, Observer, QueryEvent, TracingObserver};
pub use retry::{FailureKind, FatalCause, RetryDecision, RetryPolicy, RetryState};
pub use status::ResponseStatus;
