//! Loot catalog
//!
//! The bounded, order-stable collection of discovered signals. Entries are
//! keyed by exact frequency, carry open/close timing and tone metadata, and
//! can be flagged by the operator for triage. Flagged entries survive
//! capacity eviction; a catalog full of flagged entries saturates and
//! rejects new signals until the operator clears a flag.

use heapless::Vec;

use crate::config::LOOT_CAPACITY;
use crate::scan::band::Band;
use crate::traits::{ChannelRecord, ChannelStore};
use crate::types::{Frequency, Measurement, ToneCode};

/// Operator triage flag of a loot entry
///
/// A single three-state value: an entry can be blacklisted or whitelisted,
/// never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Flag {
    /// Not yet triaged
    #[default]
    Unflagged,
    /// Known garbage; skip and never persist as interesting
    Blacklisted,
    /// Confirmed interesting; candidate for channel promotion
    Whitelisted,
}

impl Flag {
    /// Toggle the blacklist state, clearing any whitelist
    #[must_use]
    pub const fn toggle_blacklist(self) -> Self {
        match self {
            Self::Blacklisted => Self::Unflagged,
            Self::Unflagged | Self::Whitelisted => Self::Blacklisted,
        }
    }

    /// Toggle the whitelist state, clearing any blacklist
    #[must_use]
    pub const fn toggle_whitelist(self) -> Self {
        match self {
            Self::Whitelisted => Self::Unflagged,
            Self::Unflagged | Self::Blacklisted => Self::Whitelisted,
        }
    }

    /// Whether the entry is triaged either way
    #[must_use]
    pub const fn is_flagged(self) -> bool {
        !matches!(self, Self::Unflagged)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Flag {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Unflagged => defmt::write!(f, "-"),
            Self::Blacklisted => defmt::write!(f, "BL"),
            Self::Whitelisted => defmt::write!(f, "WL"),
        }
    }
}

/// One discovered signal
#[derive(Clone, Copy, Debug)]
pub struct LootEntry {
    frequency: Frequency,
    level: u16,
    snr: u8,
    tone: ToneCode,
    open: bool,
    last_open_at: u32,
    duration_ms: u32,
    flag: Flag,
}

impl LootEntry {
    fn from_measurement(msm: &Measurement, now_ms: u32) -> Self {
        Self {
            frequency: msm.frequency,
            level: msm.level,
            snr: msm.snr,
            tone: msm.tone,
            open: msm.open,
            last_open_at: now_ms,
            duration_ms: 0,
            flag: Flag::Unflagged,
        }
    }

    /// Frequency, the entry's identity
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Most recent level reading
    #[must_use]
    pub const fn level(&self) -> u16 {
        self.level
    }

    /// Most recent signal-to-noise reading
    #[must_use]
    pub const fn snr(&self) -> u8 {
        self.snr
    }

    /// Decoded tone signalling, latched once seen
    #[must_use]
    pub const fn tone(&self) -> ToneCode {
        self.tone
    }

    /// Whether the signal was open at the last observation
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Timestamp of the most recent open observation, in clock ms
    #[must_use]
    pub const fn last_open_at(&self) -> u32 {
        self.last_open_at
    }

    /// Accumulated on-air time of the current/most recent open episode
    #[must_use]
    pub const fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Operator triage flag
    #[must_use]
    pub const fn flag(&self) -> Flag {
        self.flag
    }

    /// Whether the entry is blacklisted
    #[must_use]
    pub const fn is_blacklisted(&self) -> bool {
        matches!(self.flag, Flag::Blacklisted)
    }

    /// Whether the entry is whitelisted
    #[must_use]
    pub const fn is_whitelisted(&self) -> bool {
        matches!(self.flag, Flag::Whitelisted)
    }

    /// Convert to a channel record using the band's receiver settings
    #[must_use]
    pub fn to_channel(&self, band: &Band, scan_lists: u16) -> ChannelRecord {
        ChannelRecord {
            frequency: self.frequency,
            modulation: band.modulation(),
            step: band.step(),
            bandwidth: band.bandwidth(),
            scan_lists,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LootEntry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Loot({}, {}s, {})",
            self.frequency,
            self.duration_ms / 1000,
            self.flag
        );
    }
}

/// Catalog sort orders
///
/// Each kind maps to one comparator; ties keep the current catalog order
/// (the sort is stable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKind {
    /// Most recently open first
    #[default]
    LastOpen,
    /// Longest accumulated duration first
    Duration,
    /// Blacklisted entries first, then by frequency
    Blacklist,
    /// Ascending frequency
    Frequency,
}

impl SortKind {
    /// Display label, as shown in the sort status line
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LastOpen => "last open",
            Self::Duration => "duration",
            Self::Blacklist => "blacklist",
            Self::Frequency => "freq",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SortKind {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.label());
    }
}

/// Why an insert was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Every entry is flagged; the operator must clear one to free capacity
    Saturated,
}

#[cfg(feature = "embedded")]
impl defmt::Format for CatalogError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "catalog saturated");
    }
}

/// Why a channel promotion failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromoteError {
    /// No entry at the given index
    NoSuchEntry,
    /// The frequency is already saved as a channel
    AlreadySaved,
    /// No free channel slot remains
    StoreFull,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PromoteError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NoSuchEntry => defmt::write!(f, "no such entry"),
            Self::AlreadySaved => defmt::write!(f, "already saved"),
            Self::StoreFull => defmt::write!(f, "store full"),
        }
    }
}

/// Bounded catalog of discovered signals, keyed by exact frequency
#[derive(Default)]
pub struct LootCatalog {
    entries: Vec<LootEntry, LOOT_CAPACITY>,
    /// Identity of the most recently open entry, for flag toggles
    last_active: Option<Frequency>,
}

impl LootCatalog {
    /// Create an empty catalog
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_active: None,
        }
    }

    /// Number of catalogued signals
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been catalogued yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index` in the current sort order
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LootEntry> {
        self.entries.get(index)
    }

    /// Iterate entries in the current sort order
    pub fn iter(&self) -> impl Iterator<Item = &LootEntry> {
        self.entries.iter()
    }

    /// The most recently open entry, if still catalogued
    #[must_use]
    pub fn last_active(&self) -> Option<&LootEntry> {
        let f = self.last_active?;
        self.entries.iter().find(|e| e.frequency == f)
    }

    /// Insert or update the entry for the measurement's frequency
    ///
    /// New entries are created only for open measurements; a closed sample
    /// of an unknown frequency is noise, not a discovery. Duration
    /// accumulates tick-to-tick while an entry stays continuously open and
    /// restarts on each new open episode.
    ///
    /// At capacity, a new frequency evicts the least-recently-opened
    /// unflagged entry; when every entry is flagged the insert is rejected.
    pub fn upsert(&mut self, msm: &Measurement, now_ms: u32) -> Result<(), CatalogError> {
        if let Some(index) = self.index_of(msm.frequency) {
            self.update_at(index, msm, now_ms);
            return Ok(());
        }

        if !msm.open {
            return Ok(());
        }

        if self.entries.is_full() {
            let victim = self.eviction_victim().ok_or(CatalogError::Saturated)?;
            self.entries.remove(victim);
        }

        // A slot is free after the eviction, so this cannot fail.
        let _ = self.entries.push(LootEntry::from_measurement(msm, now_ms));
        self.last_active = Some(msm.frequency);
        Ok(())
    }

    /// Remove the entry at `index` in the current sort order
    pub fn remove(&mut self, index: usize) -> Option<LootEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        if self.last_active == Some(removed.frequency) {
            self.last_active = None;
        }
        Some(removed)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_active = None;
    }

    /// Sort the catalog; ties keep their current relative order
    pub fn sort_by(&mut self, kind: SortKind, reverse: bool) {
        // Stable insertion sort: stable slice sorting needs an allocator,
        // and the catalog is small.
        for i in 1..self.entries.len() {
            let mut j = i;
            while j > 0 && Self::precedes(kind, reverse, &self.entries[j], &self.entries[j - 1]) {
                self.entries.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Toggle the blacklist flag of the most recently open entry
    pub fn blacklist_last(&mut self) {
        if let Some(entry) = self.last_active_mut() {
            entry.flag = entry.flag.toggle_blacklist();
        }
    }

    /// Toggle the whitelist flag of the most recently open entry
    pub fn whitelist_last(&mut self) {
        if let Some(entry) = self.last_active_mut() {
            entry.flag = entry.flag.toggle_whitelist();
        }
    }

    /// Toggle the blacklist flag of the entry at `index`
    pub fn toggle_blacklist(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.flag = entry.flag.toggle_blacklist();
        }
    }

    /// Toggle the whitelist flag of the entry at `index`
    pub fn toggle_whitelist(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.flag = entry.flag.toggle_whitelist();
        }
    }

    /// Promote one entry to a persisted channel
    ///
    /// Scans the channel table from the top down for a free slot, skipping
    /// the save when the frequency already exists as a channel. Returns the
    /// slot the record was saved to.
    pub fn promote<S: ChannelStore>(
        &self,
        index: usize,
        band: &Band,
        scan_lists: u16,
        store: &mut S,
    ) -> Result<usize, PromoteError> {
        let entry = self.entries.get(index).ok_or(PromoteError::NoSuchEntry)?;
        let mut slot = store.capacity();
        let mut free = None;

        while slot > 0 {
            slot -= 1;
            if !store.exists(slot) {
                if free.is_none() {
                    free = Some(slot);
                }
                continue;
            }
            if let Some(ch) = store.load(slot) {
                if ch.frequency == entry.frequency() {
                    return Err(PromoteError::AlreadySaved);
                }
            }
        }

        let slot = free.ok_or(PromoteError::StoreFull)?;
        store.save(slot, &entry.to_channel(band, scan_lists));
        Ok(slot)
    }

    /// Promote every entry carrying `flag` to persisted channels
    ///
    /// Returns the number of records saved; already-saved frequencies are
    /// skipped silently.
    pub fn promote_flagged<S: ChannelStore>(
        &self,
        flag: Flag,
        band: &Band,
        scan_lists: u16,
        store: &mut S,
    ) -> usize {
        let mut saved = 0;
        for index in 0..self.entries.len() {
            if self.entries[index].flag != flag {
                continue;
            }
            if self.promote(index, band, scan_lists, store).is_ok() {
                saved += 1;
            }
        }
        saved
    }

    fn index_of(&self, f: Frequency) -> Option<usize> {
        self.entries.iter().position(|e| e.frequency == f)
    }

    fn last_active_mut(&mut self) -> Option<&mut LootEntry> {
        let f = self.last_active?;
        self.entries.iter_mut().find(|e| e.frequency == f)
    }

    fn update_at(&mut self, index: usize, msm: &Measurement, now_ms: u32) {
        let entry = &mut self.entries[index];

        if msm.open {
            if entry.open {
                // Continuously open: accumulate the tick delta
                entry.duration_ms = entry
                    .duration_ms
                    .saturating_add(now_ms.saturating_sub(entry.last_open_at));
            } else {
                // New open episode: fresh accumulation
                entry.duration_ms = 0;
            }
            entry.last_open_at = now_ms;
            self.last_active = Some(entry.frequency);
        }
        entry.open = msm.open;
        entry.level = msm.level;
        entry.snr = msm.snr;
        if msm.tone.is_decoded() {
            entry.tone = msm.tone;
        }
    }

    /// Index of the least-recently-opened unflagged entry, if any
    fn eviction_victim(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.flag.is_flagged())
            .min_by_key(|(_, e)| e.last_open_at)
            .map(|(i, _)| i)
    }

    /// Strict "comes before" for the stable sort
    fn precedes(kind: SortKind, reverse: bool, a: &LootEntry, b: &LootEntry) -> bool {
        let (a, b) = if reverse { (b, a) } else { (a, b) };
        match kind {
            SortKind::LastOpen => a.last_open_at > b.last_open_at,
            SortKind::Duration => a.duration_ms > b.duration_ms,
            SortKind::Blacklist => {
                let (abl, bbl) = (a.is_blacklisted(), b.is_blacklisted());
                if abl != bbl {
                    abl
                } else {
                    a.frequency < b.frequency
                }
            }
            SortKind::Frequency => a.frequency < b.frequency,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LootCatalog {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LootCatalog(len={})", self.entries.len());
    }
}
