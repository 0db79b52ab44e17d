//! Scriptable input events.
//!
//! Hosts usually call the gesture methods directly; the enum exists so a
//! session can be recorded or replayed as JSON, e.g.
//! `{"type": "pan", "x": -40.0, "y": 0.0}`.

use serde::{Deserialize, Serialize};

use super::GridViewer;
use crate::coord::GridCoordinate;
use crate::identity::IdentitySource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Pan translation in pixels, cumulative since the gesture began.
    Pan { x: f64, y: f64 },
    PanEnd,
    /// Pinch factor, cumulative since the gesture began.
    Zoom { factor: f64 },
    ZoomEnd,
    Resize { width: f64, height: f64 },
    CenterOn { column: i64, row: i64 },
    Reset,
    Reload { column: i64, row: i64 },
    ReloadAll,
}

impl<S: IdentitySource> GridViewer<S> {
    /// Route one event to the matching gesture method.
    pub fn handle_event(&mut self, event: &GestureEvent) {
        match *event {
            GestureEvent::Pan { x, y } => self.on_pan_delta(x, y),
            GestureEvent::PanEnd => self.on_pan_end(),
            GestureEvent::Zoom { factor } => self.on_zoom_delta(factor),
            GestureEvent::ZoomEnd => self.on_zoom_end(),
            GestureEvent::Resize { width, height } => self.resize(width, height),
            GestureEvent::CenterOn { column, row } => {
                self.center_on(GridCoordinate::new(column, row));
            }
            GestureEvent::Reset => self.reset(),
            GestureEvent::Reload { column, row } => {
                self.reload(GridCoordinate::new(column, row));
            }
            GestureEvent::ReloadAll => {
                self.reload_all();
            }
        }
    }
}
