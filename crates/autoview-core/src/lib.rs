#![forbid(unsafe_code)]

//! Core data model for autoview.
//!
//! This crate holds everything that does not need a host: the two managed
//! presentation [`Mode`]s, the user's [`RuleSet`] with its classification
//! predicate, the [`SettingsEvent`] vocabulary published on rule edits, and
//! the persisted [`RuleSetSnapshot`] shape.
//!
//! # Role in autoview
//! `autoview-runtime` owns the per-pane state machine and asks this crate one
//! question per activation: is this document path managed?

pub mod event;
pub mod mode;
pub mod rules;
pub mod snapshot;

pub use event::{RuleEdit, RuleKind, RuleOperation, SettingsEvent};
pub use mode::{Mode, ModeProbe, ParseModeError};
pub use rules::{Classification, EntryKind, MatchReason, RuleSet, Verdict};
pub use snapshot::RuleSetSnapshot;
