use std::num::NonZero;
use std::sync::Arc;

use crate::Result;

/// A source of reusable buffers that [`PooledBuffer`] rents from and returns to.
///
/// Implementations must be safe to use from many threads at once by unrelated owners, which is
/// why the trait requires [`Send`] and [`Sync`].
///
/// The crate ships two implementations: [`BucketPool`] for an explicitly managed pool and
/// [`SharedPool`] for a process-wide default. Custom implementations can wrap any other memory
/// source.
///
/// # Contract
///
/// * [`rent()`](Self::rent) returns a buffer of at least `min_len` elements. It may be longer.
///   The contents of the buffer are unspecified: they may be defaults or values left behind by a
///   previous renter that did not clear the buffer.
/// * [`return_buffer()`](Self::return_buffer) takes back a buffer previously issued by the same
///   pool. If `clear` is `true`, every slot must be reset before the buffer is handed out again.
/// * A buffer that the pool did not issue must be rejected with [`Error::ForeignBuffer`] without
///   corrupting the pool.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use pooled_buffer::{BufferPool, PooledBuffer, Result};
///
/// /// A pool that never reuses anything.
/// struct FreshPool;
///
/// impl BufferPool<u8> for FreshPool {
///     fn rent(&self, min_len: NonZero<usize>) -> Box<[u8]> {
///         vec![0; min_len.get()].into_boxed_slice()
///     }
///
///     fn return_buffer(&self, _buffer: Box<[u8]>, _clear: bool) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let buffer = PooledBuffer::builder()
///     .pool(FreshPool)
///     .copy_from_slice(b"hello");
///
/// assert_eq!(buffer.as_slice(), b"hello");
/// ```
///
/// [`PooledBuffer`]: crate::PooledBuffer
/// [`BucketPool`]: crate::BucketPool
/// [`SharedPool`]: crate::SharedPool
/// [`Error::ForeignBuffer`]: crate::Error::ForeignBuffer
pub trait BufferPool<T>: Send + Sync {
    /// Rents a buffer with a length of at least `min_len`.
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]>;

    /// Returns a buffer previously obtained from [`rent()`](Self::rent), clearing it first if
    /// `clear` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignBuffer`][crate::Error::ForeignBuffer] if the buffer was not
    /// issued by this pool.
    fn return_buffer(&self, buffer: Box<[T]>, clear: bool) -> Result<()>;
}

impl<T, P> BufferPool<T> for &P
where
    P: BufferPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]> {
        (**self).rent(min_len)
    }

    #[inline]
    fn return_buffer(&self, buffer: Box<[T]>, clear: bool) -> Result<()> {
        (**self).return_buffer(buffer, clear)
    }
}

impl<T, P> BufferPool<T> for Arc<P>
where
    P: BufferPool<T> + ?Sized,
{
    #[inline]
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]> {
        (**self).rent(min_len)
    }

    #[inline]
    fn return_buffer(&self, buffer: Box<[T]>, clear: bool) -> Result<()> {
        (**self).return_buffer(buffer, clear)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use new_zealand::nz;
    use static_assertions::assert_obj_safe;

    use super::*;
    use crate::Error;

    assert_obj_safe!(BufferPool<u32>);

    #[derive(Debug, Default)]
    struct CountingPool {
        rents: Mutex<Vec<usize>>,
        returns: Mutex<Vec<(usize, bool)>>,
    }

    impl BufferPool<u32> for CountingPool {
        fn rent(&self, min_len: NonZero<usize>) -> Box<[u32]> {
            self.rents.lock().unwrap().push(min_len.get());
            vec![0; min_len.get()].into_boxed_slice()
        }

        fn return_buffer(&self, buffer: Box<[u32]>, clear: bool) -> Result<()> {
            if buffer.len() == 3 {
                return Err(Error::ForeignBuffer {
                    length: buffer.len(),
                });
            }

            self.returns.lock().unwrap().push((buffer.len(), clear));
            Ok(())
        }
    }

    #[test]
    fn reference_forwards_to_pool() {
        let pool = CountingPool::default();
        let by_ref = &pool;

        let buffer = by_ref.rent(nz!(5));
        assert_eq!(buffer.len(), 5);
        by_ref.return_buffer(buffer, true).unwrap();

        assert_eq!(*pool.rents.lock().unwrap(), vec![5]);
        assert_eq!(*pool.returns.lock().unwrap(), vec![(5, true)]);
    }

    #[test]
    fn arc_forwards_to_pool() {
        let pool = Arc::new(CountingPool::default());
        let handle = Arc::clone(&pool);

        let buffer = handle.rent(nz!(2));
        handle.return_buffer(buffer, false).unwrap();

        assert_eq!(*pool.rents.lock().unwrap(), vec![2]);
        assert_eq!(*pool.returns.lock().unwrap(), vec![(2, false)]);
    }

    #[test]
    fn trait_object_forwards_to_pool() {
        let pool: Arc<dyn BufferPool<u32>> = Arc::new(CountingPool::default());

        let buffer = pool.rent(nz!(4));
        pool.return_buffer(buffer, false).unwrap();
    }

    #[test]
    fn rejection_is_forwarded() {
        let pool = CountingPool::default();
        let by_ref = &pool;

        let result = by_ref.return_buffer(vec![1, 2, 3].into_boxed_slice(), false);

        assert!(matches!(result, Err(Error::ForeignBuffer { length: 3 })));
        assert!(pool.returns.lock().unwrap().is_empty());
    }
}
