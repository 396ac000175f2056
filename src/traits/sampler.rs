//! Radio sampler contract
//!
//! The one seam between the scanning core and the receive hardware. The
//! sampler owns every blocking delay: a level read is only valid after the
//! synthesizer settles on the new frequency, and the open-confirmation
//! re-read settles longer still to ride out squelch tail artifacts.
//! Skipping either delay yields biased or stale readings.

use crate::types::{Frequency, SampleKind};

/// Tune-and-measure contract implemented by the front-end driver
///
/// The core calls these every tick; implementations must tolerate that rate
/// without degrading hardware state (no re-initialization on same-frequency
/// tunes, no register churn).
pub trait Sampler {
    /// Tune the receiver to `frequency`
    ///
    /// `precise` requests the fine tuning path (exact PLL programming);
    /// sweeps pass `true`, throwaway monitoring may pass `false`.
    fn tune(&mut self, frequency: Frequency, precise: bool);

    /// Read one settled level sample of the requested kind
    ///
    /// Blocks for the sampler's settling delay before reading. Failures are
    /// reported as 0 ("no signal"), never as an error.
    fn read_level(&mut self, kind: SampleKind) -> u16;

    /// Re-read the level with the longer anti-chatter settling delay
    ///
    /// Used once per open episode to confirm a fresh `open` classification.
    /// Must only be called while the receive path is idle.
    fn confirm_level(&mut self, kind: SampleKind) -> u16;

    /// Open or close the receive audio path
    fn enable_receive(&mut self, enabled: bool);

    /// Whether the receive audio path is currently active
    fn is_receive_active(&self) -> bool;
}
