/// Determines whether a buffer is cleared when it is returned to its pool.
///
/// Clearing resets every slot of the physical buffer to `T::default()`, dropping whatever the
/// slots held before. This prevents values (and anything they own) from lingering in pooled
/// memory while the buffer waits to be rented again.
///
/// The mode is resolved to a plain yes/no decision once, when the [`PooledBuffer`] is created.
///
/// # Examples
///
/// ```
/// use pooled_buffer::{ClearMode, PooledBuffer};
///
/// let buffer = PooledBuffer::<String>::builder()
///     .clear_mode(ClearMode::Never)
///     .with_count(4)
///     .unwrap();
///
/// assert_eq!(buffer.clear_mode(), ClearMode::Never);
/// ```
///
/// [`PooledBuffer`]: crate::PooledBuffer
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ClearMode {
    /// The buffer is always cleared when it is returned.
    Always,

    /// The buffer is never cleared when it is returned.
    Never,

    /// The buffer is cleared only if the element type may contain references.
    /// See [`may_contain_references()`]. This is the default.
    #[default]
    Auto,
}

impl ClearMode {
    /// Resolves the mode into a clear decision for element type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::ClearMode;
    ///
    /// assert!(!ClearMode::Auto.should_clear::<u64>());
    /// assert!(ClearMode::Auto.should_clear::<String>());
    /// assert!(ClearMode::Always.should_clear::<u64>());
    /// assert!(!ClearMode::Never.should_clear::<String>());
    /// ```
    #[must_use]
    #[inline]
    pub const fn should_clear<T>(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => may_contain_references::<T>(),
        }
    }

    /// The mode that reports an already resolved clear decision.
    #[must_use]
    #[inline]
    pub(crate) const fn from_decision(clear: bool) -> Self {
        if clear { Self::Always } else { Self::Never }
    }
}

/// Whether values of type `T` may own something that outlives a plain bitwise copy, such as a
/// heap allocation, a reference-counted handle or a resource handle.
///
/// This looks through nested fields: a struct with one `String` field among many integers is
/// reported as containing references, exactly like `String` itself.
///
/// Types that own memory without releasing it on drop are not detected. `ManuallyDrop<String>`,
/// `MaybeUninit<Vec<u8>>` and raw pointers into the heap are all reported as plain data. Use
/// [`ClearMode::Always`] for buffers of such types.
///
/// The answer is computed at compile time for each concrete type.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use pooled_buffer::may_contain_references;
///
/// struct Sample {
///     id: u32,
///     label: String,
/// }
///
/// assert!(!may_contain_references::<u32>());
/// assert!(!may_contain_references::<(f64, [u8; 16])>());
/// assert!(may_contain_references::<Arc<u32>>());
/// assert!(may_contain_references::<Sample>());
/// ```
#[must_use]
#[inline]
pub const fn may_contain_references<T>() -> bool {
    // Types that own anything needing release carry drop glue, and drop glue is inherited by
    // every aggregate that contains such a field.
    std::mem::needs_drop::<T>()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::mem::{ManuallyDrop, MaybeUninit};
    use std::rc::Rc;
    use std::sync::Arc;

    use static_assertions::const_assert;

    use super::*;

    #[derive(Clone, Copy)]
    struct Point {
        _x: i32,
        _y: i32,
    }

    struct WithReference {
        _value: i32,
        _label: String,
    }

    struct Nested {
        _inner: [Option<WithReference>; 2],
    }

    enum Either {
        _Plain(u64),
        _Boxed(Box<u64>),
    }

    // Resolved at compile time.
    const_assert!(!may_contain_references::<u8>());
    const_assert!(ClearMode::Auto.should_clear::<Vec<u8>>());

    #[test]
    fn default_is_auto() {
        assert_eq!(ClearMode::default(), ClearMode::Auto);
    }

    #[test]
    fn scalars_and_plain_aggregates_contain_no_references() {
        assert!(!may_contain_references::<i32>());
        assert!(!may_contain_references::<f64>());
        assert!(!may_contain_references::<bool>());
        assert!(!may_contain_references::<char>());
        assert!(!may_contain_references::<Point>());
        assert!(!may_contain_references::<[Point; 8]>());
        assert!(!may_contain_references::<(u8, Point)>());
    }

    #[test]
    fn owning_types_contain_references() {
        assert!(may_contain_references::<String>());
        assert!(may_contain_references::<Box<i32>>());
        assert!(may_contain_references::<Vec<i32>>());
        assert!(may_contain_references::<Rc<i32>>());
        assert!(may_contain_references::<Arc<i32>>());
    }

    #[test]
    fn nested_fields_are_detected() {
        assert!(may_contain_references::<WithReference>());
        assert!(may_contain_references::<Nested>());
        assert!(may_contain_references::<Either>());
        assert!(may_contain_references::<(i32, String)>());
        assert!(may_contain_references::<Option<Box<u8>>>());
    }

    #[test]
    fn wrappers_without_drop_glue_are_not_detected() {
        assert!(!may_contain_references::<ManuallyDrop<String>>());
        assert!(!may_contain_references::<MaybeUninit<Vec<u8>>>());
        assert!(!may_contain_references::<*mut u8>());

        assert!(!ClearMode::Auto.should_clear::<ManuallyDrop<String>>());
        assert!(ClearMode::Always.should_clear::<ManuallyDrop<String>>());
    }

    #[test]
    fn always_and_never_ignore_element_type() {
        assert!(ClearMode::Always.should_clear::<i32>());
        assert!(ClearMode::Always.should_clear::<String>());
        assert!(!ClearMode::Never.should_clear::<i32>());
        assert!(!ClearMode::Never.should_clear::<String>());
    }

    #[test]
    fn auto_follows_element_type() {
        assert!(!ClearMode::Auto.should_clear::<i32>());
        assert!(ClearMode::Auto.should_clear::<String>());
        assert!(ClearMode::Auto.should_clear::<WithReference>());
    }

    #[test]
    fn from_decision_never_reports_auto() {
        assert_eq!(ClearMode::from_decision(true), ClearMode::Always);
        assert_eq!(ClearMode::from_decision(false), ClearMode::Never);
    }
}
