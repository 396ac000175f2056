//! Monotonic clock contract

/// Millisecond tick source for duration and dwell math
///
/// Must be monotonic and must not wrap within a scan session; an unsigned
/// 32-bit uptime counter (49 days) is sufficient.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u32;
}
