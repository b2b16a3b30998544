//! Demonstrates dedicated pools, clear modes and a custom `BufferPool` implementation.

use std::num::NonZero;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pooled_buffer::{BucketPool, BufferPool, ClearMode, PooledBuffer, Result};

/// Wraps another pool and counts the calls that go through it.
#[derive(Debug, Default)]
struct CountingPool<P> {
    inner: P,
    rents: AtomicUsize,
    returns: AtomicUsize,
}

impl<T, P: BufferPool<T>> BufferPool<T> for CountingPool<P> {
    fn rent(&self, min_len: NonZero<usize>) -> Box<[T]> {
        self.rents.fetch_add(1, Ordering::Relaxed);
        self.inner.rent(min_len)
    }

    fn return_buffer(&self, buffer: Box<[T]>, clear: bool) -> Result<()> {
        self.returns.fetch_add(1, Ordering::Relaxed);
        self.inner.return_buffer(buffer, clear)
    }
}

fn main() {
    println!("=== Dedicated and Custom Pools ===");
    println!();

    let pool = Arc::new(CountingPool {
        inner: BucketPool::<String>::builder()
            .max_buffer_len(1024)
            .max_buffers_per_bucket(NonZero::new(4).expect("4 is not zero"))
            .build(),
        ..CountingPool::default()
    });

    let secrets = PooledBuffer::builder()
        .pool(Arc::clone(&pool))
        .copy_from_slice(&["password".to_string(), "token".to_string()]);
    println!(
        "Secrets buffer: len {} capacity {} clear mode {:?}",
        secrets.len(),
        secrets.capacity(),
        secrets.clear_mode()
    );
    secrets.release();

    let reused = PooledBuffer::builder()
        .pool(Arc::clone(&pool))
        .with_count(2)
        .expect("2 is a valid count");
    println!("Reused buffer after clearing: {:?}", reused.as_slice());
    drop(reused);

    // Opting out of clearing leaves the old values for the next renter.
    let names = PooledBuffer::builder()
        .pool(Arc::clone(&pool))
        .clear_mode(ClearMode::Never)
        .copy_from_slice(&["alice".to_string()]);
    drop(names);

    let leftover = PooledBuffer::builder()
        .pool(Arc::clone(&pool))
        .with_count(1)
        .expect("1 is a valid count");
    println!("Reused buffer without clearing: {:?}", leftover.as_slice());
    drop(leftover);

    println!();
    println!(
        "Pool saw {} rents and {} returns, holds {} idle buffers",
        pool.rents.load(Ordering::Relaxed),
        pool.returns.load(Ordering::Relaxed),
        pool.inner.idle_buffer_count()
    );
}
