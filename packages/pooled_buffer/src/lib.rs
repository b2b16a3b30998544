#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Fixed-length buffers backed by memory rented from a pool.
//!
//! This crate provides [`PooledBuffer`], a buffer that presents exactly the number of elements it
//! was created with while the memory behind it is rented from a [`BufferPool`] and returned to
//! that pool, exactly once, when the buffer is dropped or [released](PooledBuffer::release).
//!
//! Use it on hot paths that repeatedly need short-lived buffers (serialization scratch space,
//! packet assembly, batch processing) to avoid allocating fresh memory every time.
//!
//! # Key Features
//!
//! - **Exact logical length**: pools may hand out longer buffers than requested; the extra slots
//!   are never visible through any view, index or iterator
//! - **Exactly-once return**: ownership guarantees the backing buffer goes back to its pool once,
//!   no matter how the `PooledBuffer` is dropped or shared
//! - **Type-aware clearing**: with [`ClearMode::Auto`], buffers of types that can own resources
//!   (strings, handles, boxes) are cleared on return, plain data is not
//! - **Several ways to populate**: from a slice, from a [`BulkSource`], from an iterator of known
//!   length, or from an iterator of unknown length with geometric growth
//! - **Failure-safe population**: if a source fails or panics, every buffer rented so far is
//!   back in the pool before the failure reaches the caller
//! - **Pluggable pools**: the process-wide [`SharedPool`] by default, a dedicated [`BucketPool`]
//!   or any custom [`BufferPool`] implementation
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use pooled_buffer::PooledBuffer;
//!
//! let mut buffer = PooledBuffer::from_slice(b"hello world");
//! buffer.make_ascii_uppercase();
//!
//! assert_eq!(buffer.as_slice(), b"HELLO WORLD");
//!
//! // The memory goes back to the process-wide pool when `buffer` is dropped.
//! ```
//!
//! ## Populating from an iterator of unknown length
//!
//! ```
//! use pooled_buffer::PooledBuffer;
//!
//! let evens = PooledBuffer::builder()
//!     .suggested_capacity(8)
//!     .collect_from((0..100_u32).filter(|n| n % 2 == 0))
//!     .unwrap();
//!
//! assert_eq!(evens.len(), 50);
//! assert_eq!(evens.last(), Some(&98));
//! ```
//!
//! ## Dedicated pool and clearing
//!
//! ```
//! use pooled_buffer::{BucketPool, ClearMode, PooledBuffer};
//!
//! let pool = BucketPool::<String>::new();
//!
//! let tokens = PooledBuffer::builder()
//!     .pool(&pool)
//!     .copy_from_slice(&["access".to_string(), "refresh".to_string()]);
//!
//! // Strings own heap memory, so the automatic policy clears the buffer on return.
//! assert_eq!(tokens.clear_mode(), ClearMode::Always);
//!
//! drop(tokens);
//!
//! let reused = PooledBuffer::builder().pool(&pool).with_count(2).unwrap();
//! assert!(reused.iter().all(String::is_empty));
//! ```
//!
//! # Thread safety
//!
//! [`PooledBuffer`] is [`Send`] and [`Sync`] whenever its element type is. All pools in this
//! crate are thread-safe and every [`BufferPool`] must be.

mod bucket_pool;
mod bucket_pool_builder;
mod builder;
mod bulk_source;
mod clear_mode;
mod constants;
mod error;
mod ingest;
mod pool;
mod pooled_buffer;
mod shared_pool;

pub use bucket_pool::BucketPool;
pub use bucket_pool_builder::BucketPoolBuilder;
pub(crate) use bucket_pool_builder::MIN_BUCKET_LEN;
pub use builder::PooledBufferBuilder;
pub use bulk_source::BulkSource;
pub use clear_mode::*;
pub use error::*;
pub use pool::BufferPool;
pub use pooled_buffer::PooledBuffer;
pub use shared_pool::SharedPool;
