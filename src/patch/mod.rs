//! Journaled, reversible file patches.
//!
//! [`PatchJournal::apply_patch`] rewrites a file with caller-supplied bytes
//! after saving the original next to it; [`PatchJournal::restore`] puts the
//! original back. The transform itself is opaque to this module.

mod journal;
mod record;

pub use journal::{PatchError, PatchJournal, PatchState};
pub use record::{PatchRecord, RECORD_SUFFIX, record_path};
