//! Reusable display slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::{ContentToken, TileImage};
use crate::coord::GridCoordinate;
use crate::layout::PixelRect;

/// Index of a cell in the pool's arena. Stable for the life of the cell;
/// a vacated index may be handed to a later cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Content lifecycle of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// No load issued yet.
    Idle,
    /// A fetch for the current token is outstanding.
    Loading,
    /// The current token's image is displayed.
    Applied,
    /// The current token's load failed; the cell is blank.
    Failed,
}

/// A display slot bound to one grid coordinate.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    coordinate: GridCoordinate,
    frame: PixelRect,
    token: ContentToken,
    state: LoadState,
    image: Option<TileImage>,
}

impl Cell {
    pub(crate) fn new(
        id: CellId,
        coordinate: GridCoordinate,
        frame: PixelRect,
        token: ContentToken,
    ) -> Self {
        Self {
            id,
            coordinate,
            frame,
            token,
            state: LoadState::Idle,
            image: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn coordinate(&self) -> GridCoordinate {
        self.coordinate
    }

    /// Pixel rectangle from the most recent layout pass.
    pub fn frame(&self) -> PixelRect {
        self.frame
    }

    /// Token of the current binding.
    pub fn token(&self) -> ContentToken {
        self.token
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Displayed image, `None` while loading or after a failure.
    pub fn image(&self) -> Option<&TileImage> {
        self.image.as_ref()
    }

    pub(crate) fn reposition(&mut self, frame: PixelRect) {
        self.frame = frame;
    }

    /// Bind to `coordinate` under a fresh token and start over as `Loading`.
    pub(crate) fn rebind(
        &mut self,
        coordinate: GridCoordinate,
        frame: PixelRect,
        token: ContentToken,
    ) {
        self.coordinate = coordinate;
        self.frame = frame;
        self.restart(token);
    }

    /// Clear content and switch to `token` without moving.
    pub(crate) fn restart(&mut self, token: ContentToken) {
        self.token = token;
        self.image = None;
        self.state = LoadState::Loading;
    }

    pub(crate) fn apply_image(&mut self, image: TileImage) {
        self.image = Some(image);
        self.state = LoadState::Applied;
    }

    pub(crate) fn apply_failure(&mut self) {
        self.image = None;
        self.state = LoadState::Failed;
    }
}
