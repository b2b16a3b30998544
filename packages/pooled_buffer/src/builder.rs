use std::convert::Infallible;
use std::marker::PhantomData;

use crate::{
    BufferPool, BulkSource, ClearMode, PooledBuffer, Result, SharedPool, SourceError, ingest,
};

const DEFAULT_SUGGESTED_CAPACITY: usize = 4;

/// Builder for creating an instance of [`PooledBuffer`].
///
/// The builder collects the options that apply to any way of populating a buffer (the pool to
/// rent from, the clear policy and a growth hint) and then finishes with one of the population
/// methods:
///
/// | Method                                          | Source                            |
/// |-------------------------------------------------|-----------------------------------|
/// | [`with_count()`](Self::with_count)              | nothing, slots keep pool contents |
/// | [`copy_from_slice()`](Self::copy_from_slice)    | a slice of cloneable elements     |
/// | [`copy_from()`](Self::copy_from)                | a [`BulkSource`]                  |
/// | [`collect_exact()`](Self::collect_exact)        | an iterator of known length       |
/// | [`collect_from()`](Self::collect_from)          | an iterator of unknown length     |
/// | [`try_collect_from()`](Self::try_collect_from)  | an iterator of fallible items     |
///
/// If population fails for any reason, including a panic in the source, every buffer rented
/// along the way has already been returned to the pool when the failure reaches the caller.
///
/// # Examples
///
/// ```
/// use pooled_buffer::{ClearMode, PooledBuffer};
///
/// let buffer = PooledBuffer::builder()
///     .clear_mode(ClearMode::Always)
///     .suggested_capacity(100)
///     .collect_from((1..=10).map(|n: u32| n * n))
///     .unwrap();
///
/// assert_eq!(buffer.len(), 10);
/// assert_eq!(buffer[9], 100);
/// ```
#[derive(derive_more::Debug)]
#[must_use]
pub struct PooledBufferBuilder<T, P = SharedPool> {
    clear_mode: ClearMode,
    suggested_capacity: usize,

    #[debug(ignore)]
    pool: P,

    #[debug(ignore)]
    _element: PhantomData<fn() -> T>,
}

impl<T> PooledBufferBuilder<T, SharedPool> {
    /// Creates a builder that rents from the process-wide [`SharedPool`].
    ///
    /// This is the same as [`PooledBuffer::builder()`] but also usable for element types that
    /// the shared pool cannot serve, as long as a custom pool is set with [`pool()`](Self::pool)
    /// before populating.
    #[inline]
    pub fn new() -> Self {
        Self {
            clear_mode: ClearMode::default(),
            suggested_capacity: DEFAULT_SUGGESTED_CAPACITY,
            pool: SharedPool::new(),
            _element: PhantomData,
        }
    }
}

impl<T> Default for PooledBufferBuilder<T, SharedPool> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> PooledBufferBuilder<T, P> {
    /// Sets the pool that buffers are rented from and returned to.
    ///
    /// Any [`BufferPool`] works, including references and `Arc`s to a pool.
    #[inline]
    pub fn pool<Q>(self, pool: Q) -> PooledBufferBuilder<T, Q> {
        PooledBufferBuilder {
            clear_mode: self.clear_mode,
            suggested_capacity: self.suggested_capacity,
            pool,
            _element: PhantomData,
        }
    }

    /// Sets whether buffers are cleared when they go back to the pool.
    ///
    /// The default is [`ClearMode::Auto`], which clears only if the element type can own
    /// resources.
    #[inline]
    pub fn clear_mode(mut self, clear_mode: ClearMode) -> Self {
        self.clear_mode = clear_mode;
        self
    }

    /// Sets the length of the first buffer rented by [`collect_from()`](Self::collect_from) and
    /// [`try_collect_from()`](Self::try_collect_from). Ignored by the other population methods.
    ///
    /// A good hint avoids growing (and thereby renting several buffers). Zero is treated as one.
    #[inline]
    pub fn suggested_capacity(mut self, capacity: usize) -> Self {
        self.suggested_capacity = capacity;
        self
    }
}

impl<T, P> PooledBufferBuilder<T, P>
where
    P: BufferPool<T>,
{
    /// Rents a buffer of `count` elements without populating it.
    ///
    /// The elements are whatever the pool handed out. For a reused buffer that was not cleared,
    /// this can be data left behind by a previous renter.
    ///
    /// Nothing is rented if `count` is zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `count` exceeds the
    /// largest possible buffer of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::PooledBuffer;
    ///
    /// let mut buffer = PooledBuffer::<u8>::builder().with_count(3).unwrap();
    /// buffer.copy_from_slice(&[1, 2, 3]);
    ///
    /// assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    /// ```
    pub fn with_count(self, count: usize) -> Result<PooledBuffer<T, P>> {
        let clear = self.clear_mode.should_clear::<T>();
        let buffer = ingest::with_count(&self.pool, count)?;

        Ok(PooledBuffer::from_parts(buffer, count, clear, self.pool))
    }

    /// Rents a buffer and clones every element of `source` into it.
    ///
    /// If a clone panics, the buffer is returned to the pool before the panic propagates.
    #[must_use]
    pub fn copy_from_slice(self, source: &[T]) -> PooledBuffer<T, P>
    where
        T: Clone,
    {
        let clear = self.clear_mode.should_clear::<T>();
        let buffer = ingest::copy_from_slice(&self.pool, clear, source);

        PooledBuffer::from_parts(buffer, source.len(), clear, self.pool)
    }

    /// Rents a buffer of the source's length and lets the source copy its elements into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CopyFailed`](crate::Error::CopyFailed) if the source fails to copy, and
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if the source reports a length
    /// larger than the largest possible buffer of `T`.
    pub fn copy_from<S>(self, source: &S) -> Result<PooledBuffer<T, P>>
    where
        S: BulkSource<T> + ?Sized,
    {
        let clear = self.clear_mode.should_clear::<T>();
        let (buffer, count) = ingest::copy_from(&self.pool, clear, source)?;

        Ok(PooledBuffer::from_parts(buffer, count, clear, self.pool))
    }

    /// Rents a buffer of the length reported by `items` and moves the items into it in order.
    ///
    /// Items beyond the reported length are not consumed. If the iterator produces fewer items
    /// than reported, the buffer holds only the items produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if the reported length
    /// exceeds the largest possible buffer of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::PooledBuffer;
    ///
    /// let words = ["alpha", "beta", "gamma"];
    ///
    /// let lengths = PooledBuffer::builder()
    ///     .collect_exact(words.iter().map(|word| word.len()))
    ///     .unwrap();
    ///
    /// assert_eq!(lengths.as_slice(), &[5, 4, 5]);
    /// ```
    pub fn collect_exact<I>(self, items: I) -> Result<PooledBuffer<T, P>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let clear = self.clear_mode.should_clear::<T>();
        let (buffer, count) = ingest::collect_exact(&self.pool, clear, items.into_iter())?;

        Ok(PooledBuffer::from_parts(buffer, count, clear, self.pool))
    }

    /// Moves the items of an iterator of unknown length into a rented buffer, renting larger
    /// buffers as needed.
    ///
    /// Starts with a buffer of the [suggested capacity](Self::suggested_capacity) and doubles it
    /// whenever it fills up. Outgrown buffers go back to the pool immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if the suggested capacity
    /// exceeds the largest possible buffer of `T`, and
    /// [`Error::CapacityOverflow`](crate::Error::CapacityOverflow) if the items do not fit into
    /// the largest possible buffer.
    pub fn collect_from<I>(self, items: I) -> Result<PooledBuffer<T, P>>
    where
        I: IntoIterator<Item = T>,
    {
        self.try_collect_from(items.into_iter().map(Ok::<T, Infallible>))
    }

    /// Like [`collect_from()`](Self::collect_from) but for items that may fail to be produced.
    ///
    /// Population stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CopyFailed`](crate::Error::CopyFailed) wrapping the first item error, in
    /// addition to the errors of [`collect_from()`](Self::collect_from).
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::{Error, PooledBuffer};
    ///
    /// let parsed = PooledBuffer::builder()
    ///     .try_collect_from("1,2,x".split(',').map(str::parse::<u8>));
    ///
    /// assert!(matches!(parsed, Err(Error::CopyFailed(_))));
    /// ```
    pub fn try_collect_from<I, E>(self, items: I) -> Result<PooledBuffer<T, P>>
    where
        I: IntoIterator<Item = std::result::Result<T, E>>,
        E: Into<SourceError>,
    {
        let clear = self.clear_mode.should_clear::<T>();
        let (buffer, count) = ingest::collect_from(
            &self.pool,
            clear,
            self.suggested_capacity,
            items.into_iter(),
        )?;

        Ok(PooledBuffer::from_parts(buffer, count, clear, self.pool))
    }
}
