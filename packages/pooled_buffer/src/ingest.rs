//! Population strategies that rent a buffer and fill it from a source.
//!
//! Every rented buffer is held by a scope guard until population succeeds. If the source fails
//! (returns an error or panics), the guard returns the buffer to its pool before the failure
//! reaches the caller.

use std::mem;
use std::num::NonZero;

use new_zealand::nz;
use scopeguard::ScopeGuard;

use crate::constants::ERR_SHORT_BUFFER;
use crate::{BufferPool, BulkSource, Error, Result, SourceError};

/// A populated buffer and the number of elements written into it.
///
/// The buffer is `None` when the source was known to be empty and nothing was rented.
pub(crate) type Populated<T> = (Option<Box<[T]>>, usize);

/// The longest buffer of `T` that can exist, matching the limit of `Vec<T>`.
#[must_use]
pub(crate) fn max_buffer_len<T>() -> usize {
    // Zero-sized elements occupy no memory, so only the index type limits them.
    isize::MAX
        .unsigned_abs()
        .checked_div(size_of::<T>())
        .unwrap_or(usize::MAX)
}

/// The length to request when a full buffer of length `current` needs to grow.
///
/// Doubles the length, capped at `max`. Returns `None` if the buffer is already at the cap.
#[must_use]
pub(crate) fn next_rent_len(current: usize, max: usize) -> Option<NonZero<usize>> {
    if current >= max {
        return None;
    }

    NonZero::new(current.saturating_mul(2).min(max)).or(Some(nz!(1)))
}

/// Rents a buffer with room for `count` elements. Nothing is rented for a count of zero.
pub(crate) fn with_count<T, P>(pool: &P, count: usize) -> Result<Option<Box<[T]>>>
where
    P: BufferPool<T>,
{
    validate_len::<T>("count", count)?;

    Ok(NonZero::new(count).map(|count| rent(pool, count)))
}

/// Rents a buffer and clones every element of `source` into it.
pub(crate) fn copy_from_slice<T, P>(pool: &P, clear: bool, source: &[T]) -> Option<Box<[T]>>
where
    T: Clone,
    P: BufferPool<T>,
{
    let len = NonZero::new(source.len())?;

    let mut buffer = guard(pool, rent(pool, len), clear);

    buffer
        .get_mut(..len.get())
        .expect(ERR_SHORT_BUFFER)
        .clone_from_slice(source);

    Some(ScopeGuard::into_inner(buffer))
}

/// Rents a buffer and lets `source` copy its elements into it in one call.
///
/// The source length is read once. The returned count is that length.
pub(crate) fn copy_from<T, P, S>(pool: &P, clear: bool, source: &S) -> Result<Populated<T>>
where
    P: BufferPool<T>,
    S: BulkSource<T> + ?Sized,
{
    let Some(len) = NonZero::new(source.len()) else {
        return Ok((None, 0));
    };

    validate_len::<T>("count", len.get())?;

    let mut buffer = guard(pool, rent(pool, len), clear);

    source
        .copy_to(buffer.get_mut(..len.get()).expect(ERR_SHORT_BUFFER))
        .map_err(Error::CopyFailed)?;

    Ok((Some(ScopeGuard::into_inner(buffer)), len.get()))
}

/// Rents a buffer of the length reported by `items` and assigns the items one by one.
///
/// At most the reported number of items is consumed. If the iterator ends early, the returned
/// count is the number of items actually produced.
pub(crate) fn collect_exact<T, P, I>(pool: &P, clear: bool, items: I) -> Result<Populated<T>>
where
    P: BufferPool<T>,
    I: ExactSizeIterator<Item = T>,
{
    let Some(len) = NonZero::new(items.len()) else {
        return Ok((None, 0));
    };

    validate_len::<T>("count", len.get())?;

    let mut buffer = guard(pool, rent(pool, len), clear);
    let mut written: usize = 0;

    for (slot, item) in buffer.iter_mut().take(len.get()).zip(items) {
        *slot = item;

        // Cannot wrap: bounded by `len`.
        written = written.wrapping_add(1);
    }

    Ok((Some(ScopeGuard::into_inner(buffer)), written))
}

/// Fills a buffer from a source of unknown length, growing geometrically as needed.
///
/// One buffer of `suggested_capacity` elements (at least 1) is always rented up front. Whenever
/// it fills up, a buffer of twice the length is rented, the written prefix is moved over and the
/// old buffer goes back to the pool.
pub(crate) fn collect_from<T, P, I, E>(
    pool: &P,
    clear: bool,
    suggested_capacity: usize,
    items: I,
) -> Result<Populated<T>>
where
    P: BufferPool<T>,
    I: Iterator<Item = std::result::Result<T, E>>,
    E: Into<SourceError>,
{
    validate_len::<T>("capacity", suggested_capacity)?;

    let max_len = max_buffer_len::<T>();
    let initial_len = NonZero::new(suggested_capacity).unwrap_or(nz!(1));

    let mut buffer = guard(pool, rent(pool, initial_len), clear);
    let mut written: usize = 0;

    for item in items {
        let item = item.map_err(|error| Error::CopyFailed(error.into()))?;

        if written == buffer.len() {
            grow(pool, clear, &mut buffer, written, max_len)?;
        }

        *buffer
            .get_mut(written)
            .expect("buffer always has room for the next item after growing") = item;

        // Cannot wrap: bounded by the buffer length.
        written = written.wrapping_add(1);
    }

    Ok((Some(ScopeGuard::into_inner(buffer)), written))
}

/// Replaces a full `buffer` with one of at least twice its length, moving the first `written`
/// elements over and returning the old buffer to the pool.
fn grow<T, P>(
    pool: &P,
    clear: bool,
    buffer: &mut Box<[T]>,
    written: usize,
    max_len: usize,
) -> Result<()>
where
    P: BufferPool<T>,
{
    let current_len = buffer.len();

    let next_len = next_rent_len(current_len, max_len).ok_or(Error::CapacityOverflow {
        length: current_len,
    })?;

    tracing::trace!(
        from = current_len,
        to = next_len.get(),
        "growing pooled buffer"
    );

    let mut grown = rent(pool, next_len);

    // Swapping moves the elements without cloning them. The old buffer receives whatever the
    // new one contained, which is about to go back to the pool anyway.
    grown
        .get_mut(..written)
        .expect(ERR_SHORT_BUFFER)
        .swap_with_slice(buffer.get_mut(..written).expect("written never exceeds length"));

    let old = mem::replace(buffer, grown);
    give_back(pool, old, clear);

    Ok(())
}

/// Returns a buffer to its pool. A rejection is logged and the buffer is dropped instead.
pub(crate) fn give_back<T, P>(pool: &P, buffer: Box<[T]>, clear: bool)
where
    P: BufferPool<T>,
{
    if let Err(error) = pool.return_buffer(buffer, clear) {
        tracing::debug!(%error, "pool rejected returned buffer, dropping it instead");
    }
}

fn rent<T, P>(pool: &P, min_len: NonZero<usize>) -> Box<[T]>
where
    P: BufferPool<T>,
{
    let buffer = pool.rent(min_len);

    assert!(
        buffer.len() >= min_len.get(),
        "{ERR_SHORT_BUFFER}: requested {min_len}, received {}",
        buffer.len()
    );

    tracing::trace!(
        requested = min_len.get(),
        received = buffer.len(),
        "rented buffer"
    );

    buffer
}

/// Holds a rented buffer, returning it to the pool unless disarmed with
/// [`ScopeGuard::into_inner`].
fn guard<T, P>(
    pool: &P,
    buffer: Box<[T]>,
    clear: bool,
) -> ScopeGuard<Box<[T]>, impl FnOnce(Box<[T]>)>
where
    P: BufferPool<T>,
{
    scopeguard::guard(buffer, move |buffer| give_back(pool, buffer, clear))
}

fn validate_len<T>(parameter: &'static str, len: usize) -> Result<()> {
    let max_len = max_buffer_len::<T>();

    if len > max_len {
        return Err(Error::InvalidArgument {
            parameter,
            problem: format!("{len} exceeds the maximum buffer length of {max_len} elements"),
        });
    }

    Ok(())
}
