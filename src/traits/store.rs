//! Channel storage contract
//!
//! Promotion of loot entries to saved channels goes through this trait; the
//! EEPROM layout, wear levelling and checksums belong to the storage layer
//! outside this crate.

use crate::types::{FilterBandwidth, Frequency, Modulation, ScanStep};

/// A persisted channel record
///
/// The subset of channel state the scanning core can produce from a loot
/// entry. The storage layer may extend it on disk; the core never sees
/// that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Receive frequency
    pub frequency: Frequency,
    /// Modulation
    pub modulation: Modulation,
    /// Tuning step
    pub step: ScanStep,
    /// Receive filter bandwidth
    pub bandwidth: FilterBandwidth,
    /// Scan-list membership bitmask
    pub scan_lists: u16,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelRecord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Ch({}, {})", self.frequency, self.modulation);
    }
}

/// Channel table access implemented by the storage layer
///
/// Lookups on failure return `None` / `false` rather than erroring; the
/// core treats those as "not found".
pub trait ChannelStore {
    /// Load the channel at `index`, if one is saved there
    fn load(&self, index: usize) -> Option<ChannelRecord>;

    /// Save `record` at `index`, overwriting any previous channel
    fn save(&mut self, index: usize, record: &ChannelRecord);

    /// Whether a channel is saved at `index`
    fn exists(&self, index: usize) -> bool;

    /// Total number of channel slots
    fn capacity(&self) -> usize;
}
