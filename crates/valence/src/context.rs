//! Runtime configuration

/// Configuration for the value runtime.
///
/// Passed to [`crate::runtime::warm_up`] once, before any value is created.
/// Controls how much payload storage the arena keeps around for reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    /// Number of empty buffers created per payload type at warm-up
    pub arena_prefill: usize,

    /// Maximum number of free buffers kept per payload type
    pub arena_max_retained: usize,

    /// Buffers with a larger capacity than this go back to the allocator
    pub arena_max_buffer_capacity: usize,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self {
            arena_prefill: 64,
            arena_max_retained: 1024,
            arena_max_buffer_capacity: 4096,
        }
    }
}

impl RuntimeContext {
    /// Create a context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with custom arena retention limits.
    pub fn with_arena_limits(max_retained: usize, max_buffer_capacity: usize) -> Self {
        Self {
            arena_max_retained: max_retained,
            arena_max_buffer_capacity: max_buffer_capacity,
            ..Default::default()
        }
    }

    /// Create a context whose arena never retains buffers.
    pub fn without_pooling() -> Self {
        Self {
            arena_prefill: 0,
            arena_max_retained: 0,
            arena_max_buffer_capacity: 0,
        }
    }

    /// Whether the arena will keep any released buffers at all.
    pub fn pooling_enabled(&self) -> bool {
        self.arena_max_retained > 0 && self.arena_max_buffer_capacity > 0
    }
}
