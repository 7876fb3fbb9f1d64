//! Arena configuration parameters.

use sevm_core::MemoryError;

/// Configuration for the page allocator.
///
/// Validated by [`Arena::with_config`](crate::Arena::with_config); all
/// values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of a standard page in bytes.
    ///
    /// Default: 4096. Requests larger than this get a dedicated page of
    /// exactly the requested size. Must be at least
    /// [`ArenaConfig::MIN_PAGE_SIZE`] and fit in a `u32`.
    pub page_size: usize,

    /// Ceiling on the cumulative bytes the arena may reserve.
    ///
    /// `None` leaves growth bounded only by the system allocator. Hitting
    /// the ceiling fails the allocation with `AllocationFailed`.
    pub max_bytes: Option<usize>,
}

impl ArenaConfig {
    /// Default standard page size in bytes.
    pub const DEFAULT_PAGE_SIZE: usize = 4096;

    /// Smallest accepted standard page size.
    ///
    /// Large enough for any fixed-size value plus its tag.
    pub const MIN_PAGE_SIZE: usize = 64;

    /// Create a config with the default page size and no ceiling.
    pub fn new() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_bytes: None,
        }
    }

    /// Set the standard page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the cumulative reservation ceiling.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Check the configuration for values the allocator cannot honour.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.page_size < Self::MIN_PAGE_SIZE {
            return Err(MemoryError::InvalidConfig {
                reason: format!(
                    "page_size must be >= {} (got {})",
                    Self::MIN_PAGE_SIZE,
                    self.page_size,
                ),
            });
        }
        if u32::try_from(self.page_size).is_err() {
            return Err(MemoryError::InvalidConfig {
                reason: format!("page_size must fit in u32 (got {})", self.page_size),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_4k() {
        let config = ArenaConfig::default();
        assert_eq!(config.page_size, 4096);
        assert_eq!(config.max_bytes, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tiny_page_rejected() {
        let config = ArenaConfig::new().with_page_size(16);
        assert!(matches!(
            config.validate(),
            Err(MemoryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn builder_sets_ceiling() {
        let config = ArenaConfig::new().with_max_bytes(1 << 20);
        assert_eq!(config.max_bytes, Some(1 << 20));
    }
}
