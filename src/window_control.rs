//! Opacity, zoom and placement adjustments for the main window.
//!
//! The numeric rules live here as plain functions so they can be checked
//! without a window:
//! - opacity is clamped to [`MIN_OPACITY`, `MAX_OPACITY`] on every change
//! - zoom moves in [`ZOOM_STEP`] increments and has no bounds
//! - moves translate the window origin by a fixed step
//!
//! [`persist_opacity`] writes the new opacity into the config store without
//! going through anything that re-initializes dependents.

use tracing::{debug, instrument};

use crate::actions::{Direction, ZoomChange};
use crate::config::ConfigError;
use crate::context::ConfigStore;

pub const MIN_OPACITY: f64 = 0.1;
pub const MAX_OPACITY: f64 = 1.0;
pub const OPACITY_STEP: f64 = 0.1;

pub const ZOOM_STEP: f64 = 0.5;
pub const DEFAULT_ZOOM_LEVEL: f64 = 0.0;

/// Clamp an opacity into the valid range. Non-finite input becomes fully opaque.
pub fn clamp_opacity(value: f64) -> f64 {
    if value.is_nan() {
        return MAX_OPACITY;
    }
    value.clamp(MIN_OPACITY, MAX_OPACITY)
}

/// Opacity after applying `delta` to `current`.
///
/// A `current` below the floor (set from outside) is not snapped first:
/// 0.05 + 0.1 yields 0.15.
pub fn adjusted_opacity(current: f64, delta: f64) -> f64 {
    clamp_opacity(current + delta)
}

/// Zoom level after one zoom step. Unbounded in both directions.
pub fn zoomed(current: f64, change: ZoomChange) -> f64 {
    match change {
        ZoomChange::In => current + ZOOM_STEP,
        ZoomChange::Out => current - ZOOM_STEP,
        ZoomChange::Reset => DEFAULT_ZOOM_LEVEL,
    }
}

/// Window origin after moving one step. Screen y grows downward.
pub fn translate(position: (i32, i32), direction: Direction, step: i32) -> (i32, i32) {
    let (x, y) = position;
    match direction {
        Direction::Left => (x.saturating_sub(step), y),
        Direction::Right => (x.saturating_add(step), y),
        Direction::Up => (x, y.saturating_sub(step)),
        Direction::Down => (x, y.saturating_add(step)),
    }
}

/// Write `opacity` into the persisted config (load, patch, save).
#[instrument(skip(store))]
pub fn persist_opacity(store: &dyn ConfigStore, opacity: f64) -> Result<(), ConfigError> {
    let mut config = store.load_config()?;
    config.opacity = clamp_opacity(opacity);
    store.save_config(&config)?;
    debug!(opacity = config.opacity, "Persisted window opacity");
    Ok(())
}
