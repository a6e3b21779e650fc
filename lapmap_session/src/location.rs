// Copyright 2025 the Lapmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::time::Duration;

use tracing::error;

use crate::messenger::Messenger;

/// One sample from the location sensor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocationFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters above sea level.
    pub altitude: f64,
    /// Ground speed in meters per second.
    pub speed: f64,
    /// Offset since the watcher was started.
    pub timestamp: Duration,
}

/// Requested positioning accuracy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Accuracy {
    /// Cell/Wi-Fi level positioning.
    Coarse,
    /// GNSS-level positioning.
    #[default]
    Fine,
}

/// Options a [`LocationWatcher`] is started with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WatchOptions {
    /// Requested accuracy.
    pub accuracy: Accuracy,
    /// Minimum time between delivered fixes; zero means sensor cadence.
    pub time_between_updates: Duration,
    /// Minimum movement in meters before a new fix is delivered.
    pub movement_threshold_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        // Lap timing wants every fix the sensor produces.
        Self {
            accuracy: Accuracy::Fine,
            time_between_updates: Duration::ZERO,
            movement_threshold_m: 0.0,
        }
    }
}

/// Error reported by a platform watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchError {
    /// Platform-specific error description.
    pub message: String,
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location watcher error: {}", self.message)
    }
}

impl std::error::Error for WatchError {}

/// Platform location sensor abstraction.
///
/// Implementations deliver fixes at sensor cadence to the `on_fix` callback
/// from whatever thread the platform uses; delivery is at-most-once and
/// duplicates or out-of-order fixes are not filtered here.
pub trait LocationWatcher {
    /// Starts watching with the given options and callbacks.
    fn start(
        &mut self,
        options: WatchOptions,
        on_fix: Box<dyn FnMut(LocationFix) + Send>,
        on_error: Box<dyn FnMut(WatchError) + Send>,
    );
}

/// Republishes watcher fixes onto a [`Messenger`].
///
/// The service starts its injected watcher at construction and publishes
/// one [`LocationFix`] message per fix for the rest of its lifetime;
/// subscribers attach to the messenger with their own scoped handles.
/// Watcher errors are logged and otherwise ignored — a lost fix is
/// recovered by the next one.
pub struct LocationService<W: LocationWatcher> {
    watcher: W,
    messenger: Messenger<LocationFix>,
}

impl<W: LocationWatcher> fmt::Debug for LocationService<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LocationService { .. }")
    }
}

impl<W: LocationWatcher> LocationService<W> {
    /// Starts the watcher and wires it to the messenger.
    pub fn new(mut watcher: W, messenger: Messenger<LocationFix>) -> Self {
        let publisher = messenger.clone();
        watcher.start(
            WatchOptions::default(),
            Box::new(move |fix| publisher.publish(&fix)),
            Box::new(|err| error!("location watcher error: {}", err.message)),
        );
        Self { watcher, messenger }
    }

    /// The channel fixes are published on.
    #[must_use]
    pub fn messenger(&self) -> &Messenger<LocationFix> {
        &self.messenger
    }

    /// The underlying watcher.
    #[must_use]
    pub fn watcher(&self) -> &W {
        &self.watcher
    }
}
