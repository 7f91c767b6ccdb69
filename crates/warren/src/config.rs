//! Group sizing policy.

/// Capacity bounds for the container's storage groups.
///
/// Every group is created with a capacity inside `[min, max]` (bulk
/// repacks that must hit an exact total may size a trailing group below
/// `min`; see [`Warren::shrink_to_fit`](crate::Warren::shrink_to_fit)).
/// Bounds are validated at construction and whenever changed on a live
/// container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupSizes {
    min: u16,
    max: u16,
}

impl GroupSizes {
    /// Smallest permitted minimum group capacity.
    ///
    /// A two-slot group cannot hold a useful erased run next to a live
    /// element, so the policy floor is 3.
    pub const FLOOR: u16 = 3;

    /// Largest permitted group capacity: the skipfield entry maximum,
    /// since a single erased run must be able to span a whole group.
    pub const CEILING: u16 = u16::MAX;

    /// Fallback minimum when the element-size heuristic would go lower.
    pub const DEFAULT_MIN_FLOOR: u16 = 8;

    /// Create a sizing policy with explicit bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min > max`.
    pub fn new(min: u16, max: u16) -> Self {
        assert!(
            min >= Self::FLOOR,
            "minimum group capacity {min} is below the floor of {}",
            Self::FLOOR
        );
        assert!(
            min <= max,
            "minimum group capacity {min} exceeds maximum {max}"
        );
        Self { min, max }
    }

    /// Default policy for elements of layout `T`.
    ///
    /// The maximum is the skipfield ceiling. The minimum is sized so that
    /// one group's header overhead is small relative to its payload: twice
    /// the combined container and group header size divided by the element
    /// size, floored at [`Self::DEFAULT_MIN_FLOOR`]. Zero-sized elements
    /// use the floor directly.
    pub fn default_for<T>() -> Self {
        let elem = std::mem::size_of::<T>();
        let min = if elem == 0 {
            Self::DEFAULT_MIN_FLOOR
        } else {
            let header = std::mem::size_of::<crate::warren::Warren<T>>()
                + std::mem::size_of::<crate::group::Group<T>>();
            let derived = (header * 2) / elem;
            derived
                .max(Self::DEFAULT_MIN_FLOOR as usize)
                .min(Self::CEILING as usize) as u16
        };
        Self {
            min,
            max: Self::CEILING,
        }
    }

    /// Minimum group capacity.
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Maximum group capacity.
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Clamp a requested capacity into this policy's bounds.
    pub(crate) fn clamp(&self, requested: usize) -> u16 {
        requested
            .max(self.min as usize)
            .min(self.max as usize) as u16
    }
}
