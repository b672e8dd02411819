//! Connection boundary.
//!
//! The core never talks to the network itself. It submits queries through
//! a [`ConnectionProvider`] and awaits the two halves of every response
//! (result records and status attributes) through a [`QueryHandle`].

pub mod http;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

pub use http::{HttpGremlinProvider, HttpOptions};

/// One opaque, server-defined result value (vertex, edge, scalar, path).
pub type ResultRecord = Value;

/// Raw status attribute map as sent by the server.
pub type StatusAttributes = Value;

/// Error reported by a provider for a submitted query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    /// The server answered with a non-success status.
    #[error("server returned status {code}: {message}")]
    Response {
        /// Protocol-level status code.
        code: i64,
        message: String,
        /// Status attributes attached to the failure, `Null` if none.
        attributes: StatusAttributes,
    },
    /// Request could not be delivered or the answer could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider was closed.
    #[error("connection closed")]
    Closed,
}

impl ConnectionError {
    /// Attributes attached to this error (`Null` for non-response errors).
    pub fn attributes(&self) -> &StatusAttributes {
        const NONE: &Value = &Value::Null;
        match self {
            ConnectionError::Response { attributes, .. } => attributes,
            ConnectionError::Transport(_) | ConnectionError::Closed => NONE,
        }
    }
}

/// In-flight query. Both values can be awaited independently and in any
/// order; each may fail with the same classified error.
pub trait QueryHandle {
    fn result_records(
        &self,
    ) -> impl Future<Output = Result<Vec<ResultRecord>, ConnectionError>> + Send;

    fn status_attributes(
        &self,
    ) -> impl Future<Output = Result<StatusAttributes, ConnectionError>> + Send;
}

/// Source of query handles over one logical connection.
pub trait ConnectionProvider {
    type Handle: QueryHandle;

    /// Hand a query to the server. Failures surface through the handle.
    fn submit(&self, query: &str) -> Self::Handle;

    /// Release the connection. Must tolerate being called after failures;
    /// handles submitted afterwards fail with [`ConnectionError::Closed`].
    fn close(&self);
}
