use std::iter;
use std::num::NonZero;
use std::sync::Mutex;

use crate::constants::ERR_POISONED_LOCK;
use crate::{BucketPoolBuilder, BufferPool, Error, MIN_BUCKET_LEN, Result};

/// A thread-safe pool of reusable buffers, grouped into buckets of power-of-two lengths.
///
/// A request is rounded up to the next bucket length (at least 16), so a rented buffer is
/// usually longer than requested. Returned buffers are kept for reuse until their bucket is full.
///
/// Requests longer than the [configured maximum][BucketPoolBuilder::max_buffer_len] are served
/// with exactly sized, freshly allocated buffers that are simply dropped when returned.
///
/// New buffers are filled with `T::default()`. Clearing a returned buffer resets every slot to
/// `T::default()` as well.
///
/// # Examples
///
/// ```
/// use pooled_buffer::{BucketPool, ClearMode, PooledBuffer};
///
/// let pool = BucketPool::<u64>::new();
///
/// let buffer = PooledBuffer::builder()
///     .pool(&pool)
///     .copy_from_slice(&[1, 2, 3]);
///
/// // The logical length is exact even though the pool handed out a longer buffer.
/// assert_eq!(buffer.len(), 3);
/// assert_eq!(buffer.capacity(), 16);
///
/// drop(buffer);
/// assert_eq!(pool.idle_buffer_count(), 1);
/// ```
///
/// # Thread safety
///
/// The pool is thread-safe ([`Send`] + [`Sync`]) when `T` is [`Send`]. Each bucket is protected
/// by its own lock, held only while a buffer is pushed or popped.
#[derive(derive_more::Debug)]
pub struct BucketPool<T> {
    /// Index `i` holds idle buffers of length `MIN_BUCKET_LEN << i`.
    #[debug(ignore)]
    buckets: Box<[Mutex<Vec<Box<[T]>>>]>,

    max_buffer_len: usize,
    max_buffers_per_bucket: NonZero<usize>,
}

impl<T> BucketPool<T> {
    /// Creates a bucket pool with the default configuration.
    ///
    /// For custom configuration, use [`BucketPool::builder()`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing a [`BucketPool`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::BucketPool;
    ///
    /// let pool = BucketPool::<u8>::builder().max_buffer_len(4096).build();
    /// assert_eq!(pool.max_buffer_len(), 4096);
    /// ```
    pub fn builder() -> BucketPoolBuilder<T> {
        BucketPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(max_buffer_len: usize, max_buffers_per_bucket: NonZero<usize>) -> Self {
        let bucket_count = bucket_index(max_buffer_len)
            .and_then(|index| index.checked_add(1))
            .expect("builder guarantees a power-of-two maximum of at least the minimum bucket");

        Self {
            buckets: iter::repeat_with(|| Mutex::new(Vec::new()))
                .take(bucket_count)
                .collect(),
            max_buffer_len,
            max_buffers_per_bucket,
        }
    }

    /// The length of the largest buffer this pool keeps for reuse.
    #[must_use]
    #[inline]
    pub fn max_buffer_len(&self) -> usize {
        self.max_buffer_len
    }

    /// The number of idle buffers currently held by the pool, across all buckets.
    #[must_use]
    pub fn idle_buffer_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.lock().expect(ERR_POISONED_LOCK).len())
            .sum()
    }

    fn bucket(&self, buffer_len: usize) -> Option<&Mutex<Vec<Box<[T]>>>> {
        bucket_index(buffer_len).and_then(|index| self.buckets.get(index))
    }
}

impl<T> Default for BucketPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BufferPool<T> for BucketPool<T>
where
    T: Default + Send,
{
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]> {
        let min_len = min_len.get();

        if min_len > self.max_buffer_len {
            tracing::trace!(min_len, "request exceeds largest bucket, allocating unpooled buffer");
            return allocate(min_len);
        }

        // Cannot overflow: the result is at most `max_buffer_len`, itself a power of two.
        let buffer_len = min_len.max(MIN_BUCKET_LEN).next_power_of_two();

        let reused = self
            .bucket(buffer_len)
            .expect("every length up to the maximum maps to a bucket")
            .lock()
            .expect(ERR_POISONED_LOCK)
            .pop();

        reused.unwrap_or_else(|| {
            tracing::trace!(buffer_len, "bucket empty, allocating new buffer");
            allocate(buffer_len)
        })
    }

    fn return_buffer(&self, mut buffer: Box<[T]>, clear: bool) -> Result<()> {
        let length = buffer.len();

        if length > self.max_buffer_len {
            tracing::debug!(length, "dropping returned buffer that is larger than any bucket");
            return Ok(());
        }

        let Some(bucket) = self.bucket(length) else {
            return Err(Error::ForeignBuffer { length });
        };

        if clear {
            buffer.fill_with(T::default);
        }

        let mut idle = bucket.lock().expect(ERR_POISONED_LOCK);

        if idle.len() < self.max_buffers_per_bucket.get() {
            idle.push(buffer);
        }

        Ok(())
    }
}

/// Maps a bucket buffer length to its bucket index, or `None` if no bucket has that length.
fn bucket_index(buffer_len: usize) -> Option<usize> {
    if !buffer_len.is_power_of_two() || buffer_len < MIN_BUCKET_LEN {
        return None;
    }

    let index = buffer_len
        .trailing_zeros()
        .checked_sub(MIN_BUCKET_LEN.trailing_zeros())?;

    usize::try_from(index).ok()
}

fn allocate<T: Default>(len: usize) -> Box<[T]> {
    iter::repeat_with(T::default).take(len).collect()
}
