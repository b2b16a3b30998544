//! Demonstrates the ways to create and populate a `PooledBuffer`.
//!
//! Every buffer in this example is rented from the process-wide shared pool and goes back to it
//! when dropped, so later buffers of the same element type reuse the same memory.

use std::collections::VecDeque;

use pooled_buffer::{PooledBuffer, SharedPool};

fn main() {
    println!("=== PooledBuffer Basic Usage ===");
    println!();

    // Fixed count: the contents are whatever the pool handed out.
    let mut scratch = PooledBuffer::<u8>::with_count(10).expect("10 is a valid count");
    scratch.fill(0xAB);
    println!(
        "with_count(10): len {} capacity {} first {:#x}",
        scratch.len(),
        scratch.capacity(),
        scratch[0]
    );
    drop(scratch);

    // Copy from a slice.
    let greeting = PooledBuffer::from_slice(b"hello pooled world");
    println!(
        "from_slice: {:?}",
        String::from_utf8_lossy(greeting.as_slice())
    );
    drop(greeting);

    // Copy from a collection in one call.
    let queue = VecDeque::from([3_u32, 1, 4, 1, 5]);
    let digits = PooledBuffer::builder()
        .copy_from(&queue)
        .expect("standard collections never fail to copy");
    println!("copy_from(VecDeque): {:?}", digits.as_slice());

    // Iterator of known length.
    let doubled = PooledBuffer::builder()
        .collect_exact(digits.iter().map(|digit| digit * 2))
        .expect("length fits into a buffer");
    println!("collect_exact: {:?}", doubled.as_slice());

    // Iterator of unknown length, growing as needed.
    let primes: PooledBuffer<u32> = (2..100_u32)
        .filter(|n| (2..*n).all(|d| n % d != 0))
        .collect();
    println!(
        "collect: {} primes below 100, capacity {}",
        primes.len(),
        primes.capacity()
    );

    drop((digits, doubled, primes));

    println!();
    println!(
        "Idle u8 buffers in the shared pool: {}",
        SharedPool::bucket_pool::<u8>().idle_buffer_count()
    );
    println!(
        "Idle u32 buffers in the shared pool: {}",
        SharedPool::bucket_pool::<u32>().idle_buffer_count()
    );
}
