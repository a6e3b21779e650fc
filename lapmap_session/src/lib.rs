// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lapmap Session: the recorded-session data model and its delivery plumbing.
//!
//! A timed activity produces an append-only, time-ordered sequence of
//! [`SessionPoint`]s. This crate owns that sequence and the pieces that feed
//! it:
//!
//! - [`SessionTrack`]: the point sequence itself. Appends go through `&self`
//!   so a location callback can extend the track while the renderer holds a
//!   read view; timestamps are monotonic by construction.
//! - [`SessionMapInfo`]: the aggregate a map view binds to — track, viewport
//!   region, and total duration.
//! - [`Messenger`] / [`Subscription`]: a typed publish/subscribe channel
//!   with scoped RAII subscription handles. Handles are acquired on enter
//!   and released on drop, never left dangling.
//! - [`LocationService`]: bridges a platform [`LocationWatcher`] onto the
//!   messenger, one published [`LocationFix`] per sensor fix.

mod info;
mod location;
mod messenger;
mod point;
mod track;

pub use info::SessionMapInfo;
pub use location::{
    Accuracy, LocationFix, LocationService, LocationWatcher, WatchError, WatchOptions,
};
pub use messenger::{Messenger, Subscription};
pub use point::SessionPoint;
pub use track::SessionTrack;
