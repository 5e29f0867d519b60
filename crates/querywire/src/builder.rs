//! # Query Builder
//!
//! Assembles a `QueryDescriptor`: the `QueryWithParams` to send, plus the
//! function that turns the batches of each response into typed items.
//!
//! ```
//! use std::num::NonZeroU64;
//! use querywire::builder::QueryBuilder;
//! use querywire::predicate::{
//!     CompoundPredicate, DomainIdPredicate, DomainPredicate, NamePredicate,
//! };
//! use querywire::query::FindDomains;
//!
//! let descriptor = QueryBuilder::new(FindDomains)
//!     .filter(CompoundPredicate::atom(DomainPredicate::Id(DomainIdPredicate::Name(
//!         NamePredicate::starts_with("wonder"),
//!     ))))
//!     .limit(NonZeroU64::new(10).unwrap())
//!     .build();
//! assert_eq!(descriptor.query().params.pagination.offset, 0);
//! ```
//!
//! ## Defaults
//! Predicate `PASS`, selector `[Atom]`, offset 0, no limit, no fetch size and
//! no sort key.

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;

use crate::error::Result;
use crate::ids::Name;
use crate::output::BatchItem;
use crate::output::QueryOutputBatchBox;
use crate::output::Selected;
use crate::predicate::CompoundPredicate;
use crate::query::IterableQuery;
use crate::query::Pagination;
use crate::query::QueryParams;
use crate::query::QueryWithFilter;
use crate::query::QueryWithParams;
use crate::query::Sorting;
use crate::selector::AtomSelector;

/// Turns the batches of one response into items.
pub type DecodeBatches<O> = fn(Vec<QueryOutputBatchBox>) -> Result<Vec<O>>;

/// A finished query, ready to be started.
pub struct QueryDescriptor<O> {
    query: QueryWithParams,
    decode: DecodeBatches<O>,
}

impl<O> QueryDescriptor<O> {
    pub fn query(&self) -> &QueryWithParams {
        &self.query
    }

    pub fn decode(&self, batches: Vec<QueryOutputBatchBox>) -> Result<Vec<O>> {
        (self.decode)(batches)
    }

    pub fn into_parts(self) -> (QueryWithParams, DecodeBatches<O>) {
        (self.query, self.decode)
    }
}

impl<O> Clone for QueryDescriptor<O> {
    fn clone(&self) -> Self {
        Self { query: self.query.clone(), decode: self.decode }
    }
}

impl<O> fmt::Debug for QueryDescriptor<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("query", &self.query)
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

/// Builds a query of kind `Q` yielding items of type `O`.
pub struct QueryBuilder<Q: IterableQuery, O = <Q as IterableQuery>::Item> {
    query: Q,
    predicate: CompoundPredicate<Q::Predicate>,
    selector: Vec<Q::Selector>,
    pagination: Pagination,
    sorting: Sorting,
    fetch_size: Option<NonZeroU64>,
    output: PhantomData<fn() -> O>,
}

impl<Q: IterableQuery> QueryBuilder<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            predicate: CompoundPredicate::PASS,
            selector: vec![Q::Selector::atom()],
            pagination: Pagination::default(),
            sorting: Sorting::default(),
            fetch_size: None,
            output: PhantomData,
        }
    }
}

impl<Q: IterableQuery, O: Selected> QueryBuilder<Q, O> {
    /// Replaces the predicate.
    pub fn filter(mut self, predicate: CompoundPredicate<Q::Predicate>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Narrows the output to one selected value per match.
    pub fn select<T: BatchItem + Selected>(self, selector: Q::Selector) -> QueryBuilder<Q, T> {
        self.reshape(vec![selector])
    }

    /// Narrows the output to a tuple, one selector per element.
    ///
    /// The number of selectors must equal the tuple width; a mismatch is
    /// reported when the first response is decoded.
    pub fn select_tuple<T: Selected>(self, selectors: Vec<Q::Selector>) -> QueryBuilder<Q, T> {
        self.reshape(selectors)
    }

    fn reshape<T: Selected>(self, selector: Vec<Q::Selector>) -> QueryBuilder<Q, T> {
        QueryBuilder {
            query: self.query,
            predicate: self.predicate,
            selector,
            pagination: self.pagination,
            sorting: self.sorting,
            fetch_size: self.fetch_size,
            output: PhantomData,
        }
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.pagination.offset = offset;
        self
    }

    pub fn limit(mut self, limit: NonZeroU64) -> Self {
        self.pagination.limit = Some(limit);
        self
    }

    pub fn fetch_size(mut self, fetch_size: NonZeroU64) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn sort_by_metadata_key(mut self, key: Name) -> Self {
        self.sorting.sort_by_metadata_key = Some(key);
        self
    }

    /// Fetch size, only if none was set.
    pub fn fetch_size_or(mut self, fetch_size: Option<NonZeroU64>) -> Self {
        self.fetch_size = self.fetch_size.or(fetch_size);
        self
    }

    pub fn build(self) -> QueryDescriptor<O> {
        let query = Q::into_box(QueryWithFilter::new(self.query, self.predicate, self.selector));
        let params = QueryParams {
            pagination: self.pagination,
            sorting: self.sorting,
            fetch_size: self.fetch_size,
        };
        QueryDescriptor {
            query: QueryWithParams { query, params },
            decode: O::from_batches,
        }
    }
}
