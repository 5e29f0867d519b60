//! # Query Output
//!
//! A response to an iterable query carries one batch per selector, the count
//! of items the server still holds, and a cursor when there is more to fetch.
//!
//! ## Invariants
//! - **Aligned batches**: every batch in one response has the same length;
//!   the n-th item of each belongs to the same matched entity.
//! - **Cursor means more**: `continue_cursor` is present exactly when the
//!   server expects a `Continue` request.

use std::num::NonZeroU64;

use crate::error::Error;
use crate::error::Result;
use crate::macros::for_each_batch;

/// A batch of `T`, or the batch handed back unchanged when it holds another kind.
pub type BatchResult<T> = std::result::Result<Vec<T>, QueryOutputBatchBox>;

/// Item types that have a batch variant of their own.
pub trait BatchItem: Sized {
    /// Unwraps a batch of this item type, handing back any other batch.
    fn from_batch(batch: QueryOutputBatchBox) -> BatchResult<Self>;

    fn into_batch(items: Vec<Self>) -> QueryOutputBatchBox;
}

/// The shape a caller asked for: one item per selector, zipped together.
pub trait Selected: Sized {
    /// Number of selectors, and so of batches per response.
    const WIDTH: usize;

    fn from_batches(batches: Vec<QueryOutputBatchBox>) -> Result<Vec<Self>>;
}

macro_rules! batch_box {
    ($($variant:ident($item:ty) = $disc:literal),+ $(,)?) => {
        scalepack::scale_enum! {
            /// A homogeneous batch of selected values.
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub enum QueryOutputBatchBox {
                $( $variant(Vec<$item>) = $disc ),+
            }
        }

        impl QueryOutputBatchBox {
            pub fn len(&self) -> usize {
                match self {
                    $( Self::$variant(items) => items.len(), )+
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        $(
            impl BatchItem for $item {
                fn from_batch(batch: QueryOutputBatchBox) -> BatchResult<Self> {
                    match batch {
                        QueryOutputBatchBox::$variant(items) => Ok(items),
                        other => Err(other),
                    }
                }

                fn into_batch(items: Vec<Self>) -> QueryOutputBatchBox {
                    QueryOutputBatchBox::$variant(items)
                }
            }

            impl Selected for $item {
                const WIDTH: usize = 1;

                fn from_batches(batches: Vec<QueryOutputBatchBox>) -> Result<Vec<Self>> {
                    let [batch] = exact_batches::<1>(batches)?;
                    unwrap_batch(batch)
                }
            }
        )+
    };
}

for_each_batch!(batch_box);

fn exact_batches<const N: usize>(
    batches: Vec<QueryOutputBatchBox>,
) -> Result<[QueryOutputBatchBox; N]> {
    batches
        .try_into()
        .map_err(|got: Vec<QueryOutputBatchBox>| {
            Error::OutputShape(format!("expected {} batch(es), got {}", N, got.len()))
        })
}

fn unwrap_batch<T: BatchItem>(batch: QueryOutputBatchBox) -> Result<Vec<T>> {
    T::from_batch(batch).map_err(|other| {
        Error::OutputShape(format!(
            "expected a batch of {}, got {}",
            std::any::type_name::<T>(),
            other.tag(),
        ))
    })
}

fn check_aligned(lens: &[usize]) -> Result<()> {
    match lens.split_first() {
        Some((first, rest)) if rest.iter().any(|len| len != first) => {
            Err(Error::OutputShape(format!("batches of unequal length {:?}", lens)))
        }
        _ => Ok(()),
    }
}

impl<A: BatchItem, B: BatchItem> Selected for (A, B) {
    const WIDTH: usize = 2;

    fn from_batches(batches: Vec<QueryOutputBatchBox>) -> Result<Vec<Self>> {
        let [a, b] = exact_batches::<2>(batches)?;
        let a = unwrap_batch::<A>(a)?;
        let b = unwrap_batch::<B>(b)?;
        check_aligned(&[a.len(), b.len()])?;
        Ok(a.into_iter().zip(b).collect())
    }
}

impl<A: BatchItem, B: BatchItem, C: BatchItem> Selected for (A, B, C) {
    const WIDTH: usize = 3;

    fn from_batches(batches: Vec<QueryOutputBatchBox>) -> Result<Vec<Self>> {
        let [a, b, c] = exact_batches::<3>(batches)?;
        let a = unwrap_batch::<A>(a)?;
        let b = unwrap_batch::<B>(b)?;
        let c = unwrap_batch::<C>(c)?;
        check_aligned(&[a.len(), b.len(), c.len()])?;
        Ok(a.into_iter().zip(b).zip(c).map(|((a, b), c)| (a, b, c)).collect())
    }
}

scalepack::scale_struct! {
    /// Server-side position in a live query.
    ///
    /// Opaque to the client: it is echoed back verbatim in `Continue`.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct ForwardCursor {
        query: String,
        cursor: NonZeroU64,
    }
}

impl ForwardCursor {
    pub fn new(query: impl Into<String>, cursor: NonZeroU64) -> Self {
        Self { query: query.into(), cursor }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> NonZeroU64 {
        self.cursor
    }
}

scalepack::scale_struct! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct QueryOutput {
        pub batch: Vec<QueryOutputBatchBox>,
        pub remaining_items: u64,
        pub continue_cursor: Option<ForwardCursor>,
    }
}

impl QueryOutput {
    /// Items in this response, counted along the first batch.
    pub fn items(&self) -> usize {
        self.batch.first().map_or(0, QueryOutputBatchBox::len)
    }
}
