//! Process-wide pool of value payload buffers
//!
//! Short-lived vector values are created and released at a very high rate
//! during evaluation. Instead of returning their payload buffers to the
//! global allocator, the last release of a value hands its buffer back to
//! the arena, and the next vector of the same element type picks it up.
//!
//! The arena is initialized once by [`crate::runtime::warm_up`]. Values
//! created before that simply allocate and free through the global
//! allocator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::context::RuntimeContext;
use crate::object::ElementRef;

/// Capacity of the buffers created at warm-up.
const PREFILL_CAPACITY: usize = 16;

static ARENA: OnceLock<ValueArena> = OnceLock::new();

/// Counters describing the traffic through one [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers handed out
    pub acquired: usize,

    /// Handed-out buffers that came from the free list
    pub reused: usize,

    /// Buffers accepted back onto the free list
    pub released: usize,

    /// Buffers returned to the allocator instead (too large, or pool full)
    pub discarded: usize,

    /// Buffers currently on the free list
    pub retained: usize,
}

#[derive(Debug, Default)]
struct PoolCounters {
    acquired: AtomicUsize,
    reused: AtomicUsize,
    released: AtomicUsize,
    discarded: AtomicUsize,
}

/// A free list of cleared `Vec<T>` buffers.
#[derive(Debug)]
pub struct BufferPool<T> {
    free: Mutex<Vec<Vec<T>>>,
    max_retained: usize,
    max_buffer_capacity: usize,
    counters: PoolCounters,
}

impl<T> BufferPool<T> {
    /// Create a pool holding `prefill` empty buffers.
    pub fn new(prefill: usize, max_retained: usize, max_buffer_capacity: usize) -> Self {
        let capacity = PREFILL_CAPACITY.min(max_buffer_capacity);
        let free = if capacity == 0 {
            Vec::new()
        } else {
            (0..prefill.min(max_retained))
                .map(|_| Vec::with_capacity(capacity))
                .collect()
        };

        Self {
            free: Mutex::new(free),
            max_retained,
            max_buffer_capacity,
            counters: PoolCounters::default(),
        }
    }

    /// Hand out an empty buffer able to hold at least `capacity` elements.
    pub fn acquire(&self, capacity: usize) -> Vec<T> {
        self.counters.acquired.fetch_add(1, Ordering::Relaxed);

        let recycled = self.lock().pop();
        match recycled {
            Some(mut buf) => {
                self.counters.reused.fetch_add(1, Ordering::Relaxed);
                buf.reserve(capacity);
                buf
            }
            None => Vec::with_capacity(capacity),
        }
    }

    /// Take a buffer back. Its contents are dropped before it is pooled.
    pub fn release(&self, mut buf: Vec<T>) {
        // Nothing was ever allocated for it
        if buf.capacity() == 0 {
            return;
        }

        buf.clear();
        if buf.capacity() > self.max_buffer_capacity {
            self.discard(buf.capacity());
            return;
        }

        let mut free = self.lock();
        if free.len() >= self.max_retained {
            drop(free);
            self.discard(buf.capacity());
            return;
        }
        free.push(buf);
        self.counters.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of this pool's counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            reused: self.counters.reused.load(Ordering::Relaxed),
            released: self.counters.released.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
            retained: self.lock().len(),
        }
    }

    fn discard(&self, capacity: usize) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(capacity, "arena discarded buffer");
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<T>>> {
        // A panic while holding the lock cannot leave the free list inconsistent
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-element-type buffer pools backing all vector payloads.
#[derive(Debug)]
pub struct ValueArena {
    logical: BufferPool<bool>,
    int: BufferPool<i64>,
    float: BufferPool<f64>,
    string: BufferPool<String>,
    object: BufferPool<ElementRef>,
}

/// Counters for every pool in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Logical payload buffers
    pub logical: PoolStats,
    /// Integer payload buffers
    pub int: PoolStats,
    /// Float payload buffers
    pub float: PoolStats,
    /// String payload buffers
    pub string: PoolStats,
    /// Object element buffers
    pub object: PoolStats,
}

impl ValueArena {
    /// Create an arena sized by `ctx`.
    pub fn new(ctx: &RuntimeContext) -> Self {
        let prefill = ctx.arena_prefill;
        let retained = ctx.arena_max_retained;
        let capacity = ctx.arena_max_buffer_capacity;

        Self {
            logical: BufferPool::new(prefill, retained, capacity),
            int: BufferPool::new(prefill, retained, capacity),
            float: BufferPool::new(prefill, retained, capacity),
            string: BufferPool::new(prefill, retained, capacity),
            object: BufferPool::new(prefill, retained, capacity),
        }
    }

    /// Snapshot of all pool counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            logical: self.logical.stats(),
            int: self.int.stats(),
            float: self.float.stats(),
            string: self.string.stats(),
            object: self.object.stats(),
        }
    }
}

/// Payload element types that have a pool in the arena.
pub trait Pooled: Sized {
    /// The pool for this element type.
    fn pool(arena: &ValueArena) -> &BufferPool<Self>;
}

impl Pooled for bool {
    fn pool(arena: &ValueArena) -> &BufferPool<Self> {
        &arena.logical
    }
}

impl Pooled for i64 {
    fn pool(arena: &ValueArena) -> &BufferPool<Self> {
        &arena.int
    }
}

impl Pooled for f64 {
    fn pool(arena: &ValueArena) -> &BufferPool<Self> {
        &arena.float
    }
}

impl Pooled for String {
    fn pool(arena: &ValueArena) -> &BufferPool<Self> {
        &arena.string
    }
}

impl Pooled for ElementRef {
    fn pool(arena: &ValueArena) -> &BufferPool<Self> {
        &arena.object
    }
}

/// Initialize the process-wide arena. Later calls return the existing arena.
pub fn initialize(ctx: &RuntimeContext) -> &'static ValueArena {
    ARENA.get_or_init(|| {
        tracing::debug!(
            prefill = ctx.arena_prefill,
            max_retained = ctx.arena_max_retained,
            max_buffer_capacity = ctx.arena_max_buffer_capacity,
            "initializing value arena"
        );
        ValueArena::new(ctx)
    })
}

/// The process-wide arena, if it has been initialized.
pub fn global() -> Option<&'static ValueArena> {
    ARENA.get()
}

/// Get an empty buffer with room for `capacity` elements.
pub(crate) fn acquire<T: Pooled>(capacity: usize) -> Vec<T> {
    match ARENA.get() {
        Some(arena) => T::pool(arena).acquire(capacity),
        None => Vec::with_capacity(capacity),
    }
}

/// Return a buffer whose value has been released.
pub(crate) fn release<T: Pooled>(buf: Vec<T>) {
    if let Some(arena) = ARENA.get() {
        T::pool(arena).release(buf);
    }
}
