use std::any::{Any, TypeId};
use std::num::NonZero;
use std::sync::{Arc, LazyLock, RwLock};

use foldhash::{HashMap, HashMapExt};

use crate::constants::ERR_POISONED_LOCK;
use crate::{BucketPool, BufferPool, Result};

type Registry = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

// One bucket pool per element type, created on first use and kept for the life of the process.
// Only the first use of a type takes the write lock.
static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Handle to the process-wide buffer pool, the default pool of [`PooledBuffer`].
///
/// The first time a buffer of some element type `T` is rented, a [`BucketPool<T>`] with the
/// default configuration is created for that type. All later rentals of `T` buffers anywhere in
/// the process share it.
///
/// The handle itself is zero-sized and freely copyable.
///
/// # Examples
///
/// ```
/// use pooled_buffer::{PooledBuffer, SharedPool};
///
/// // These are equivalent.
/// let a = PooledBuffer::<u8>::with_count(10).unwrap();
/// let b = PooledBuffer::<u8>::builder()
///     .pool(SharedPool::new())
///     .with_count(10)
///     .unwrap();
///
/// assert_eq!(a.len(), b.len());
/// ```
///
/// [`PooledBuffer`]: crate::PooledBuffer
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct SharedPool;

impl SharedPool {
    /// Creates a handle to the process-wide pool.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the process-wide bucket pool that serves buffers of element type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::SharedPool;
    ///
    /// let pool = SharedPool::bucket_pool::<u16>();
    /// assert_eq!(pool.max_buffer_len(), 1024 * 1024);
    /// ```
    #[must_use]
    pub fn bucket_pool<T>() -> Arc<BucketPool<T>>
    where
        T: Default + Send + 'static,
    {
        let type_id = TypeId::of::<T>();

        let existing = REGISTRY
            .read()
            .expect(ERR_POISONED_LOCK)
            .get(&type_id)
            .map(Arc::clone);

        // Another thread may have registered the type since the read lock was released.
        let entry = existing.unwrap_or_else(|| {
            Arc::clone(
                REGISTRY
                    .write()
                    .expect(ERR_POISONED_LOCK)
                    .entry(type_id)
                    .or_insert_with(|| Arc::new(BucketPool::<T>::new())),
            )
        });

        entry
            .downcast::<BucketPool<T>>()
            .expect("registry entries are keyed by the TypeId of their element type")
    }
}

impl<T> BufferPool<T> for SharedPool
where
    T: Default + Send + 'static,
{
    #[inline]
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]> {
        Self::bucket_pool::<T>().rent(min_len)
    }

    #[inline]
    fn return_buffer(&self, buffer: Box<[T]>, clear: bool) -> Result<()> {
        Self::bucket_pool::<T>().return_buffer(buffer, clear)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SharedPool: Send, Sync, Copy, BufferPool<u8>, BufferPool<String>);

    // Each test uses its own element type so that parallel tests do not share bucket pools.

    #[test]
    fn same_type_shares_one_pool() {
        #[derive(Default)]
        struct Element;

        let first = SharedPool::bucket_pool::<Element>();
        let second = SharedPool::bucket_pool::<Element>();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn buffers_are_reused_through_handle() {
        #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
        struct Element(u32);

        let pool = SharedPool::new();

        let mut buffer: Box<[Element]> = pool.rent(nz!(5));
        buffer[0] = Element(7);
        pool.return_buffer(buffer, false).unwrap();

        assert_eq!(SharedPool::bucket_pool::<Element>().idle_buffer_count(), 1);

        let buffer: Box<[Element]> = pool.rent(nz!(5));
        assert_eq!(buffer[0], Element(7));
    }

    #[test]
    fn foreign_buffer_is_rejected() {
        #[derive(Default)]
        struct Element;

        let result =
            SharedPool::new().return_buffer(Box::<[Element]>::from([Element, Element]), false);

        assert!(result.is_err());
    }

    #[test]
    fn registry_is_shared_between_threads() {
        #[derive(Default)]
        struct Element;

        let here = SharedPool::bucket_pool::<Element>();
        let there = thread::spawn(SharedPool::bucket_pool::<Element>)
            .join()
            .unwrap();

        assert!(Arc::ptr_eq(&here, &there));
    }

    #[test]
    fn concurrent_first_use_creates_one_pool() {
        #[derive(Default)]
        struct Element;

        const THREADS: usize = 8;

        let barrier = Arc::new(Barrier::new(THREADS));

        let pools = (0..THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);

                thread::spawn(move || {
                    barrier.wait();
                    SharedPool::bucket_pool::<Element>()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        for pool in &pools {
            assert!(Arc::ptr_eq(pool, &pools[0]));
        }
    }
}
