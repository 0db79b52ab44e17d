//! Cell recycling pool.
//!
//! Cells live in an index-stable arena. Each layout pass reconciles the
//! current coordinate→cell bindings against the new window:
//! - cells whose coordinate is still inside the window are kept (repositioned only)
//! - cells that left the window form the surplus
//! - every uncovered window coordinate takes a surplus cell, or a new one
//!   when the surplus is exhausted
//! - whatever surplus remains is removed
//!
//! Allocation is therefore bounded by the largest window ever seen, and loads
//! are issued only for coordinates that were not already covered.

mod cell;

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::content::{Completion, CompletionOutcome, ContentToken, LoadRequest};
use crate::coord::GridCoordinate;
use crate::layout::{PixelRect, VisibleWindow};

pub use cell::{Cell, CellId, LoadState};

/// What one reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Cells whose coordinate stayed inside the window.
    pub retained: usize,
    /// Surplus cells moved onto new coordinates.
    pub recycled: usize,
    /// Cells created because the surplus ran out.
    pub allocated: usize,
    /// Surplus cells removed after every coordinate was covered.
    pub discarded: Vec<CellId>,
    /// One load per newly bound coordinate, in window order.
    pub loads: Vec<LoadRequest>,
}

impl ReconcileReport {
    pub fn reloads(&self) -> usize {
        self.loads.len()
    }
}

/// Owns every live cell and the coordinate→cell bindings.
#[derive(Debug, Default)]
pub struct CellPool {
    slots: Vec<Option<Cell>>,
    vacant: Vec<usize>,
    bindings: HashMap<GridCoordinate, CellId>,
    last_token: u64,
}

impl CellPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live (bound) cells.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Arena high-water mark: the most cells ever live at once.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn bindings(&self) -> &HashMap<GridCoordinate, CellId> {
        &self.bindings
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn cell_at(&self, coord: GridCoordinate) -> Option<&Cell> {
        self.bindings.get(&coord).and_then(|id| self.cell(*id))
    }

    /// Live cells in arena order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Rebind the pool to exactly cover `window`.
    ///
    /// `geometry` supplies the pixel rectangle of a coordinate for this pass.
    /// Surplus cells are handed out oldest-coordinate first (row-major order
    /// of the coordinate they are leaving).
    pub fn reconcile(
        &mut self,
        window: &VisibleWindow,
        geometry: impl Fn(GridCoordinate) -> PixelRect,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut leaving: Vec<(GridCoordinate, CellId)> = Vec::new();
        self.bindings.retain(|coord, id| {
            let keep = window.contains(*coord);
            if !keep {
                leaving.push((*coord, *id));
            }
            keep
        });
        leaving.sort_unstable_by_key(|(coord, _)| *coord);
        let mut surplus: VecDeque<CellId> = leaving.into_iter().map(|(_, id)| id).collect();
        report.retained = self.bindings.len();

        for coord in window.iter() {
            let frame = geometry(coord);
            if let Some(id) = self.bindings.get(&coord).copied() {
                if let Some(cell) = self.cell_mut(id) {
                    cell.reposition(frame);
                }
                continue;
            }

            let token = self.mint_token();
            let id = if let Some(id) = surplus.pop_front() {
                if let Some(cell) = self.cell_mut(id) {
                    cell.rebind(coord, frame, token);
                }
                report.recycled += 1;
                id
            } else {
                report.allocated += 1;
                self.allocate(coord, frame, token)
            };

            self.bindings.insert(coord, id);
            report.loads.push(LoadRequest {
                cell: id,
                coordinate: coord,
                token,
            });
        }

        for id in surplus {
            self.release(id);
            report.discarded.push(id);
        }

        debug!(
            retained = report.retained,
            recycled = report.recycled,
            allocated = report.allocated,
            discarded = report.discarded.len(),
            live = self.bindings.len(),
            "reconciled cell pool"
        );
        report
    }

    /// Explicitly reload the cell at `coord` under a fresh token.
    pub fn reload(&mut self, coord: GridCoordinate) -> Option<LoadRequest> {
        let id = self.bindings.get(&coord).copied()?;
        let token = self.mint_token();
        let cell = self.cell_mut(id)?;
        cell.restart(token);
        Some(LoadRequest {
            cell: id,
            coordinate: coord,
            token,
        })
    }

    /// Reload every live cell, in row-major coordinate order.
    pub fn reload_all(&mut self) -> Vec<LoadRequest> {
        let mut coords: Vec<GridCoordinate> = self.bindings.keys().copied().collect();
        coords.sort_unstable();
        coords
            .into_iter()
            .filter_map(|coord| self.reload(coord))
            .collect()
    }

    /// Apply a finished load if, and only if, its token is still current.
    pub fn apply_completion(&mut self, completion: Completion) -> CompletionOutcome {
        let Completion {
            cell: id,
            token,
            result,
        } = completion;

        let Some(cell) = self.cell_mut(id) else {
            trace!(cell = %id, %token, "dropping completion for removed cell");
            return CompletionOutcome::Stale;
        };
        if cell.token() != token {
            trace!(
                cell = %id,
                %token,
                current = %cell.token(),
                "dropping stale completion"
            );
            return CompletionOutcome::Stale;
        }

        match result {
            Ok(image) => {
                cell.apply_image(image);
                CompletionOutcome::Applied
            }
            Err(err) => {
                debug!(
                    cell = %id,
                    coordinate = %cell.coordinate(),
                    error = %err,
                    "tile load failed"
                );
                cell.apply_failure();
                CompletionOutcome::Failed(err)
            }
        }
    }

    fn mint_token(&mut self) -> ContentToken {
        self.last_token += 1;
        ContentToken(self.last_token)
    }

    fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn allocate(
        &mut self,
        coord: GridCoordinate,
        frame: PixelRect,
        token: ContentToken,
    ) -> CellId {
        let index = self.vacant.pop().unwrap_or(self.slots.len());
        let id = CellId(index);
        let mut cell = Cell::new(id, coord, frame, token);
        cell.restart(token);
        match self.slots.get_mut(index) {
            Some(slot) => *slot = Some(cell),
            None => self.slots.push(Some(cell)),
        }
        id
    }

    fn release(&mut self, id: CellId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.vacant.push(id.0);
            }
        }
    }
}
