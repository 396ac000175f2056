//! Scanner Firmware Core Library
//!
//! This library provides the spectrum scanning and signal-cataloging core
//! for a handheld RF transceiver. It sweeps a frequency range, adaptively
//! separates real signals from noise, catalogs what it finds with recency
//! and duration statistics, bins observed levels into a fixed-width
//! histogram, and supports zooming into sub-ranges without losing scan
//! continuity.
//!
//! # Architecture
//!
//! The core sits between the scheduler and the hardware layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   APPS / PRESENTATION                        │
//! │  Scanner UI  │  Loot List  │  Analyzer  │  Freq Catcher      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     SCANNING CORE (this crate)               │
//! │  Scan Controller │ Squelch │ Spectrum Bins │ Loot Catalog    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 COLLABORATOR CONTRACTS                       │
//! │  Sampler (front-end chip) │ ChannelStore (EEPROM) │ Clock    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The surrounding firmware drives [`scan::controller::ScanController`]
//! with one tick per scheduler slot, renders its read-only snapshots, and
//! forwards key events to its input operations. The core never draws
//! pixels, parses key codes or touches storage layout.
//!
//! # Design Principles
//!
//! - **No ambient state**: one `ScanController` owns a whole session
//! - **Type-driven design**: custom types enforce invariants at compile time
//! - **Clamp, don't fail**: bounded stacks evict, arithmetic saturates
//! - **Collaborators own blocking**: every delay lives behind a trait
//! - **Explicit error handling**: fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Measurement math
///
/// Rounded domain mapping and order statistics over level samples.
pub mod dsp;

/// Spectrum scanning engine
///
/// Bands and zoom navigation, squelch calibration, spectrum binning, the
/// loot catalog, the scan state machine and the frequency catcher.
pub mod scan;

/// Collaborator contracts
///
/// Traits the firmware layers implement: sampler, channel store, clock.
pub mod traits;

/// Shared types used across modules
pub mod types;

/// Scan engine configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::scan::band::{Band, RangeStack};
    pub use crate::scan::catcher::{BandFilter, CatchOutcome, FrequencyCatcher};
    pub use crate::scan::controller::{ScanConfig, ScanController, ScanState};
    pub use crate::scan::loot::{Flag, LootCatalog, SortKind};
    pub use crate::scan::spectrum::{Cursor, RollingGraph, SpectrumBins};
    pub use crate::scan::squelch::SquelchCalibrator;
    pub use crate::traits::{ChannelRecord, ChannelStore, Clock, Sampler};
    pub use crate::types::*;

    // Error handling
    pub use core::result::Result;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
