//! Deterministic recomputation of a participant's claimable entries.
//!
//! Proof data flows through the [`VestingScheduler`], each unlock step is split
//! by the [`Denominator`], and the [`AddressAssigner`] lays the chunks out as
//! timelocked entries. Every stage is pure, so the same proof always yields the
//! same reference claim.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assign;
pub mod denominate;
pub mod presets;
pub mod reference;
pub mod schedule;

pub use assign::AddressAssigner;
pub use denominate::Denominator;
pub use presets::{SourcePreset, policy_for_source};
pub use reference::derive_reference;
pub use schedule::{MAX_UNLOCK_STEPS, UnlockStep, VestingScheduler};
