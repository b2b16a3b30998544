use std::collections::VecDeque;

use crate::SourceError;

/// A collection that knows its exact length up front and can copy all of its elements into a
/// target slice in one call.
///
/// This is the most efficient way to populate a [`PooledBuffer`] from an existing collection, via
/// [`PooledBufferBuilder::copy_from()`]. The copy may fail, in which case the rented buffer goes
/// back to the pool before the failure is reported as [`Error::CopyFailed`].
///
/// # Examples
///
/// ```
/// use pooled_buffer::{BulkSource, PooledBuffer, SourceError};
///
/// /// Produces the squares of `0..len`.
/// struct Squares {
///     len: usize,
/// }
///
/// impl BulkSource<u64> for Squares {
///     fn len(&self) -> usize {
///         self.len
///     }
///
///     fn copy_to(&self, target: &mut [u64]) -> Result<(), SourceError> {
///         for (n, slot) in (0_u64..).zip(target.iter_mut()) {
///             *slot = n.checked_mul(n).ok_or("square does not fit in u64")?;
///         }
///         Ok(())
///     }
/// }
///
/// let buffer = PooledBuffer::builder()
///     .copy_from(&Squares { len: 4 })
///     .unwrap();
///
/// assert_eq!(buffer.as_slice(), &[0, 1, 4, 9]);
/// ```
///
/// [`PooledBuffer`]: crate::PooledBuffer
/// [`PooledBufferBuilder::copy_from()`]: crate::PooledBufferBuilder::copy_from
/// [`Error::CopyFailed`]: crate::Error::CopyFailed
pub trait BulkSource<T> {
    /// The exact number of elements that [`copy_to()`](Self::copy_to) writes.
    fn len(&self) -> usize;

    /// Whether the source has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every element of the source, in order, into `target`.
    ///
    /// The caller guarantees that `target.len() == self.len()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot produce its elements. The contents of `target` are
    /// unspecified in that case.
    fn copy_to(&self, target: &mut [T]) -> Result<(), SourceError>;
}

impl<T: Clone> BulkSource<T> for [T] {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn copy_to(&self, target: &mut [T]) -> Result<(), SourceError> {
        target.clone_from_slice(self);
        Ok(())
    }
}

impl<T: Clone, const N: usize> BulkSource<T> for [T; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn copy_to(&self, target: &mut [T]) -> Result<(), SourceError> {
        target.clone_from_slice(self);
        Ok(())
    }
}

impl<T: Clone> BulkSource<T> for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }

    #[inline]
    fn copy_to(&self, target: &mut [T]) -> Result<(), SourceError> {
        target.clone_from_slice(self);
        Ok(())
    }
}

impl<T: Clone> BulkSource<T> for VecDeque<T> {
    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn copy_to(&self, target: &mut [T]) -> Result<(), SourceError> {
        // The ring buffer may wrap around, in which case it is stored as two runs.
        let (front, back) = self.as_slices();
        let (target_front, target_back) = target.split_at_mut(front.len());

        target_front.clone_from_slice(front);
        target_back.clone_from_slice(back);
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn copied<T, S>(source: &S) -> Vec<T>
    where
        T: Clone + Default,
        S: BulkSource<T> + ?Sized,
    {
        let mut target = vec![T::default(); source.len()];
        source.copy_to(&mut target).unwrap();
        target
    }

    #[test]
    fn slice_copies_in_order() {
        let source: &[i32] = &[3, 1, 2];

        assert_eq!(BulkSource::len(source), 3);
        assert_eq!(copied(source), vec![3, 1, 2]);
    }

    #[test]
    fn array_copies_in_order() {
        let source = ["a".to_string(), "b".to_string()];

        assert_eq!(BulkSource::len(&source), 2);
        assert_eq!(copied(&source), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn vec_copies_in_order() {
        let source = vec![1_u8, 2, 3, 4];

        assert_eq!(copied(&source), source);
    }

    #[test]
    fn wrapped_deque_copies_in_order() {
        let mut source = VecDeque::with_capacity(4);
        source.extend([1, 2, 3, 4]);
        source.pop_front();
        source.pop_front();
        source.push_back(5);
        source.push_back(6);

        assert_eq!(copied(&source), vec![3, 4, 5, 6]);
    }

    #[test]
    fn empty_sources_report_empty() {
        assert!(BulkSource::<u8>::is_empty(&Vec::<u8>::new()));
        assert!(BulkSource::<u8>::is_empty(&VecDeque::<u8>::new()));
        assert!(BulkSource::<u8>::is_empty(&[0_u8; 0]));
        assert!(!BulkSource::<u8>::is_empty(&[0_u8; 1]));
    }
}
