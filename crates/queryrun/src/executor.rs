//! # Query Executor
//!
//! Runs a `QueryDescriptor` as a stream of batches.
//!
//! ```text
//! Start(query) -> batch 1 + cursor
//! Continue(cursor) -> batch 2 + cursor
//! Continue(cursor) -> batch 3, no cursor -> end of stream
//! ```
//!
//! ## Invariants
//! - **One in flight**: the next request is sent only when the consumer
//!   polls for the next batch, and only after the previous response arrived.
//! - **Forward only**: the stream consumes its descriptor and cannot be
//!   restarted; dropping it sends nothing more.
//! - **Stop on failure**: after an error the stream ends.

use futures::Stream;
use futures::TryStreamExt;
use futures::stream;
use querywire::ForwardCursor;
use querywire::QueryDescriptor;
use querywire::QueryOutput;
use querywire::QueryRequest;
use querywire::QueryResponse;
use querywire::QueryWithParams;
use querywire::SingularQuery;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::error::Result;

enum Step {
    Start(QueryWithParams),
    Continue(ForwardCursor),
    Done,
}

impl Client {
    /// Streams the batches of an iterable query, one request per batch.
    pub fn execute<'a, O: 'a>(
        &'a self,
        descriptor: QueryDescriptor<O>,
    ) -> impl Stream<Item = Result<Vec<O>>> + 'a {
        let (query, decode) = descriptor.into_parts();
        stream::try_unfold(Step::Start(query), move |step| async move {
            let request = match step {
                Step::Start(query) => QueryRequest::Start(query),
                Step::Continue(cursor) => QueryRequest::Continue(cursor),
                Step::Done => return Ok::<_, Error>(None),
            };
            let output = self.iterable(request).await?;
            debug!(
                items = output.items(),
                remaining = output.remaining_items,
                has_cursor = output.continue_cursor.is_some(),
                "received batch"
            );
            let next = match output.continue_cursor {
                Some(cursor) => Step::Continue(cursor),
                None => Step::Done,
            };
            let items = decode(output.batch)?;
            Ok(Some((items, next)))
        })
    }

    /// Drains every batch into one vector, in server order.
    pub async fn execute_all<O>(&self, descriptor: QueryDescriptor<O>) -> Result<Vec<O>> {
        self.execute(descriptor).try_concat().await
    }

    /// Exactly one item, or `Error::Cardinality`.
    pub async fn execute_single<O>(&self, descriptor: QueryDescriptor<O>) -> Result<O> {
        let mut items = self.execute_all(descriptor).await?;
        match items.len() {
            1 => items.pop().ok_or(Error::Cardinality { expected: "exactly one", found: 0 }),
            found => Err(Error::Cardinality { expected: "exactly one", found }),
        }
    }

    /// Zero or one item; more is `Error::Cardinality`.
    pub async fn execute_single_opt<O>(&self, descriptor: QueryDescriptor<O>) -> Result<Option<O>> {
        let mut items = self.execute_all(descriptor).await?;
        match items.len() {
            0 | 1 => Ok(items.pop()),
            found => Err(Error::Cardinality { expected: "at most one", found }),
        }
    }

    /// Runs a singular query in one round trip.
    pub async fn execute_singular<Q: SingularQuery>(&self, query: Q) -> Result<Q::Output> {
        let output = match self.send(QueryRequest::Singular(query.into_box())).await? {
            QueryResponse::Singular(output) => output,
            QueryResponse::Iterable(_) => {
                return Err(Error::Protocol("iterable response to a singular query".to_owned()));
            }
        };
        let tag = output.tag();
        Q::extract(output)
            .ok_or_else(|| Error::Protocol(format!("unexpected singular output `{}`", tag)))
    }

    async fn iterable(&self, request: QueryRequest) -> Result<QueryOutput> {
        match self.send(request).await? {
            QueryResponse::Iterable(output) => Ok(output),
            QueryResponse::Singular(_) => {
                Err(Error::Protocol("singular response to an iterable query".to_owned()))
            }
        }
    }
}
