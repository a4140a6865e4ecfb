/// Optional "release resources" capability for cached values.
///
/// The cache invokes [`release`](Release::release) at most once per value, at
/// the moment the value leaves the cache through eviction, [`remove`], or
/// [`clear`] - never while the value is still reachable - and only when the
/// cache was built with the disposal policy enabled. The provided body does
/// nothing, so types without resources to free implement the trait with an
/// empty block:
///
/// ```
/// use bounded_lru::Release;
///
/// struct Metadata {
///     revision: u64,
/// }
///
/// impl Release for Metadata {}
/// ```
///
/// Types that do hold resources override the hook:
///
/// ```
/// use bounded_lru::Release;
///
/// struct PooledBuffer {
///     data: Vec<u8>,
/// }
///
/// impl Release for PooledBuffer {
///     fn release(&mut self) {
///         self.data.clear();
///         self.data.shrink_to_fit();
///     }
/// }
/// ```
///
/// The cache does not catch panics from `release`; they propagate to the
/// caller of whichever operation triggered the removal.
///
/// [`remove`]: crate::LruCache::remove
/// [`clear`]: crate::LruCache::clear
pub trait Release {
    /// Releases resources held by this value. The default implementation
    /// does nothing.
    fn release(&mut self) {}
}

macro_rules! resource_free {
    ($($ty:ty),* $(,)?) => {
        $(impl Release for $ty {})*
    };
}

resource_free!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
);

impl Release for &str {}

impl<T: Release + ?Sized> Release for Box<T> {
    fn release(&mut self) {
        (**self).release();
    }
}

impl<T: Release> Release for Option<T> {
    fn release(&mut self) {
        if let Some(value) = self {
            value.release();
        }
    }
}

impl<T> Release for Vec<T> {}

// Shared values cannot be mutated through the cache's handle; the clone held
// by the cache simply drops.
impl<T> Release for std::sync::Arc<T> {}
