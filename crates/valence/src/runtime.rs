//! One-time runtime warm-up
//!
//! Values can be created before warm-up; payload buffers then come from the
//! allocator directly instead of the arena.

use std::sync::{Arc, OnceLock};

use crate::arena;
use crate::context::RuntimeContext;
use crate::error::Result;
use crate::object::{global_registry, test_element_class, test_element_definition};
use crate::value::constants;

static WARM: OnceLock<Result<()>> = OnceLock::new();

/// Initialize the arena, the canonical constants, and the built-in classes.
///
/// Only the first call does any work; later calls return its outcome and
/// ignore `ctx`.
///
/// # Example
///
/// ```
/// use valence::{runtime, RuntimeContext};
///
/// runtime::warm_up(&RuntimeContext::default()).unwrap();
/// assert!(runtime::is_warm());
/// ```
pub fn warm_up(ctx: &RuntimeContext) -> Result<()> {
    WARM.get_or_init(|| {
        tracing::debug!(pooling = ctx.pooling_enabled(), "warming up value runtime");
        arena::initialize(ctx);
        constants();

        let class = test_element_class();
        test_element_definition()?;
        if global_registry().get(class.name()).is_none() {
            global_registry().register(Arc::clone(class), None)?;
        }

        tracing::debug!(classes = global_registry().len(), "value runtime ready");
        Ok(())
    })
    .clone()
}

/// Whether [`warm_up`] has completed successfully.
pub fn is_warm() -> bool {
    matches!(WARM.get(), Some(Ok(())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::TEST_ELEMENT_CLASS_NAME;

    #[test]
    fn test_warm_up_is_idempotent() {
        warm_up(&RuntimeContext::default()).unwrap();
        warm_up(&RuntimeContext::without_pooling()).unwrap();
        assert!(is_warm());
        assert!(arena::global().is_some());
        assert!(global_registry().get(TEST_ELEMENT_CLASS_NAME).is_some());
    }
}
