use thiserror::Error;

/// Boxed failure reported by a population source, such as a [`BulkSource`][crate::BulkSource]
/// or a fallible iterator.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when constructing pooled buffers or returning them to a pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided an argument that cannot be satisfied.
    #[error("invalid argument '{parameter}': {problem}")]
    InvalidArgument {
        /// Name of the parameter that was invalid (e.g. `count` or `capacity`).
        parameter: &'static str,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// The source failed while its elements were being copied into the rented buffer.
    ///
    /// The rented buffer has already been returned to its pool when this error is observed.
    #[error("source failed while populating a pooled buffer")]
    CopyFailed(#[source] SourceError),

    /// An unsized source produced more elements than the largest possible buffer can hold.
    #[error("capacity overflow: cannot grow a buffer of {length} elements any further")]
    CapacityOverflow {
        /// Length of the buffer that could not be grown.
        length: usize,
    },

    /// A pool was handed a buffer that it did not issue and refused to take it back.
    #[error("buffer of length {length} was not issued by this pool")]
    ForeignBuffer {
        /// Length of the rejected buffer.
        length: usize,
    },
}

/// A specialized `Result` type for pooled buffer operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
