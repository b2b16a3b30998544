use std::marker::PhantomData;
use std::num::NonZero;

use crate::BucketPool;

/// Length of the smallest buffers a [`BucketPool`] hands out.
pub(crate) const MIN_BUCKET_LEN: usize = 16;

pub(crate) const DEFAULT_MAX_BUFFER_LEN: usize = 1024 * 1024;

pub(crate) const DEFAULT_MAX_BUFFERS_PER_BUCKET: NonZero<usize> = new_zealand::nz!(50);

/// Builder for creating an instance of [`BucketPool`].
///
/// All settings are optional. The defaults match the process-wide [`SharedPool`]: buckets for
/// buffer lengths from 16 to 1024 * 1024 elements, each holding up to 50 idle buffers.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use pooled_buffer::BucketPool;
///
/// let pool = BucketPool::<u8>::builder()
///     .max_buffer_len(64 * 1024)
///     .max_buffers_per_bucket(NonZero::new(8).unwrap())
///     .build();
/// ```
///
/// [`SharedPool`]: crate::SharedPool
#[derive(derive_more::Debug)]
#[must_use]
pub struct BucketPoolBuilder<T> {
    max_buffer_len: usize,
    max_buffers_per_bucket: NonZero<usize>,

    #[debug(ignore)]
    _element: PhantomData<fn() -> T>,
}

impl<T> BucketPoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
            max_buffers_per_bucket: DEFAULT_MAX_BUFFERS_PER_BUCKET,
            _element: PhantomData,
        }
    }

    /// Sets the length of the largest buffer the pool keeps for reuse.
    ///
    /// Requests for longer buffers are served with freshly allocated buffers that are dropped
    /// instead of pooled when returned.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not a power of two or is smaller than 16.
    #[inline]
    pub fn max_buffer_len(mut self, len: usize) -> Self {
        assert!(
            len.is_power_of_two() && len >= MIN_BUCKET_LEN,
            "BucketPool max buffer length must be a power of two of at least {MIN_BUCKET_LEN}, got {len}"
        );
        self.max_buffer_len = len;
        self
    }

    /// Sets how many idle buffers each bucket keeps. Buffers returned to a full bucket are
    /// dropped.
    #[inline]
    pub fn max_buffers_per_bucket(mut self, count: NonZero<usize>) -> Self {
        self.max_buffers_per_bucket = count;
        self
    }

    /// Builds the bucket pool with the specified configuration.
    #[must_use]
    #[inline]
    pub fn build(self) -> BucketPool<T> {
        BucketPool::new_inner(self.max_buffer_len, self.max_buffers_per_bucket)
    }
}
