//! The grid widget: owns every piece of layout-thread state.
//!
//! A host drives a [`GridViewer`] in three steps:
//! 1. forward gestures and resizes (or scripted [`GestureEvent`]s)
//! 2. call [`GridViewer::layout`] once per frame; it does nothing unless dirty
//! 3. call [`GridViewer::pump`] to apply finished loads, then draw [`GridViewer::frames`]
//!
//! The viewer is not shared across threads. Fetches run on the tokio runtime
//! handed to [`GridViewer::new`] and come back through the loader's channel.

mod events;

use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::GridConfig;
use crate::content::{
    Completion, CompletionOutcome, ContentLoader, FetchRequest, ImageFetcher, LoadRequest,
};
use crate::coord::GridCoordinate;
use crate::error::Result;
use crate::identity::{IdentitySource, StableIdentitySource};
use crate::layout::{compute_window, PixelRect, ViewportState, VisibleWindow};
use crate::pool::{Cell, CellId, CellPool, LoadState};

pub use events::GestureEvent;

/// One drawable cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellFrame {
    pub cell: CellId,
    pub coordinate: GridCoordinate,
    pub rect: PixelRect,
    pub state: LoadState,
    pub has_image: bool,
}

impl CellFrame {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            cell: cell.id(),
            coordinate: cell.coordinate(),
            rect: cell.frame(),
            state: cell.state(),
            has_image: cell.image().is_some(),
        }
    }
}

/// Summary of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub window: VisibleWindow,
    pub retained: usize,
    pub recycled: usize,
    pub allocated: usize,
    pub discarded: usize,
    /// Fetches started by this pass.
    pub loads: usize,
}

/// Completions applied by [`GridViewer::pump`] or [`GridViewer::settle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PumpReport {
    pub applied: usize,
    pub failed: usize,
    pub stale: usize,
}

impl PumpReport {
    /// Completions seen, whatever their outcome.
    pub fn total(&self) -> usize {
        self.applied + self.failed + self.stale
    }

    fn record(&mut self, outcome: &CompletionOutcome) {
        match outcome {
            CompletionOutcome::Applied => self.applied += 1,
            CompletionOutcome::Failed(_) => self.failed += 1,
            CompletionOutcome::Stale => self.stale += 1,
        }
    }

    fn merge(&mut self, other: PumpReport) {
        self.applied += other.applied;
        self.failed += other.failed;
        self.stale += other.stale;
    }
}

/// Lifetime counters plus a snapshot of pool and loader sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewerStats {
    pub layout_passes: u64,
    pub loads_issued: u64,
    pub applied: u64,
    pub failed: u64,
    pub stale: u64,
    pub live_cells: usize,
    pub arena_capacity: usize,
    pub in_flight: usize,
}

/// Infinite, pannable, zoomable grid of remotely loaded tiles.
pub struct GridViewer<S: IdentitySource = StableIdentitySource> {
    config: GridConfig,
    viewport: ViewportState,
    pool: CellPool,
    identities: S,
    loader: ContentLoader,
    window: VisibleWindow,
    stats: ViewerStats,
}

impl GridViewer<StableIdentitySource> {
    /// Build a viewer backed by a [`StableIdentitySource`].
    ///
    /// # Errors
    /// Returns [`crate::GridError::Config`] when `config` fails validation.
    pub fn new(
        config: GridConfig,
        fetcher: Arc<dyn ImageFetcher>,
        runtime: Handle,
    ) -> Result<Self> {
        config.validate()?;
        let identities = StableIdentitySource::from_config(&config)?;
        Self::with_identity_source(config, identities, fetcher, runtime)
    }
}

impl<S: IdentitySource> GridViewer<S> {
    /// Build a viewer around a caller-supplied identity source.
    ///
    /// # Errors
    /// Returns [`crate::GridError::Config`] when `config` fails validation.
    pub fn with_identity_source(
        config: GridConfig,
        identities: S,
        fetcher: Arc<dyn ImageFetcher>,
        runtime: Handle,
    ) -> Result<Self> {
        config.validate()?;
        let loader = ContentLoader::new(fetcher, runtime, config.fetch_timeout());
        Ok(Self {
            viewport: ViewportState::new(&config),
            pool: CellPool::new(),
            identities,
            loader,
            window: VisibleWindow::default(),
            stats: ViewerStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn pool(&self) -> &CellPool {
        &self.pool
    }

    pub fn identities(&self) -> &S {
        &self.identities
    }

    /// Window populated by the most recent layout pass.
    pub fn window(&self) -> &VisibleWindow {
        &self.window
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    pub fn on_pan_delta(&mut self, translation_x: f64, translation_y: f64) {
        self.viewport.on_pan_delta(translation_x, translation_y);
    }

    pub fn on_pan_end(&mut self) {
        self.viewport.on_pan_end();
    }

    pub fn on_zoom_delta(&mut self, factor: f64) {
        self.viewport.on_zoom_delta(factor);
    }

    pub fn on_zoom_end(&mut self) {
        self.viewport.on_zoom_end();
    }

    pub fn center_on(&mut self, coord: GridCoordinate) {
        self.viewport.center_on(coord);
    }

    pub fn reset(&mut self) {
        self.viewport.reset();
    }

    pub fn needs_layout(&self) -> bool {
        self.viewport.needs_layout()
    }

    /// Run a layout pass if the viewport changed since the last one.
    pub fn layout(&mut self) -> Option<LayoutReport> {
        if self.viewport.take_needs_layout() {
            Some(self.run_layout())
        } else {
            None
        }
    }

    /// Run a layout pass unconditionally.
    pub fn force_layout(&mut self) -> LayoutReport {
        self.viewport.take_needs_layout();
        self.run_layout()
    }

    /// Apply every completion that has already arrived.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        for completion in self.loader.drain() {
            let outcome = self.apply(completion);
            report.record(&outcome);
        }
        report
    }

    /// Wait until no load is in flight, applying completions as they arrive.
    ///
    /// Loads that never finish are bounded by the fetch timeout.
    pub async fn settle(&mut self) -> PumpReport {
        let mut report = self.pump();
        while self.loader.prune_finished() > 0 {
            let Some(completion) = self.loader.next_completion().await else {
                break;
            };
            let outcome = self.apply(completion);
            report.record(&outcome);
            report.merge(self.pump());
        }
        report.merge(self.pump());
        report
    }

    /// Frame of every live cell, row-major by coordinate.
    pub fn frames(&self) -> Vec<CellFrame> {
        let mut frames: Vec<CellFrame> = self.pool.cells().map(CellFrame::from_cell).collect();
        frames.sort_unstable_by_key(|frame| frame.coordinate);
        frames
    }

    /// Cell under the pixel `(x, y)`, if one is bound there.
    pub fn cell_at_point(&self, x: f64, y: f64) -> Option<&Cell> {
        self.pool.cell_at(self.viewport.coord_for(x, y))
    }

    /// Refetch the tile at `coord`. Returns `false` when no cell is bound there.
    pub fn reload(&mut self, coord: GridCoordinate) -> bool {
        match self.pool.reload(coord) {
            Some(request) => {
                self.issue(request);
                true
            }
            None => false,
        }
    }

    /// Refetch every live tile; returns the number of loads issued.
    pub fn reload_all(&mut self) -> usize {
        let requests = self.pool.reload_all();
        let count = requests.len();
        for request in requests {
            self.issue(request);
        }
        count
    }

    pub fn stats(&self) -> ViewerStats {
        ViewerStats {
            live_cells: self.pool.len(),
            arena_capacity: self.pool.capacity(),
            in_flight: self.loader.in_flight(),
            ..self.stats
        }
    }

    fn run_layout(&mut self) -> LayoutReport {
        let window = compute_window(&self.viewport, self.config.buffer_pixels);
        let viewport = &self.viewport;
        let reconciled = self.pool.reconcile(&window, |coord| viewport.rect_for(coord));

        for id in &reconciled.discarded {
            self.loader.cancel(*id);
        }
        for request in &reconciled.loads {
            self.issue(*request);
        }

        self.stats.layout_passes += 1;
        let report = LayoutReport {
            window: window.clone(),
            retained: reconciled.retained,
            recycled: reconciled.recycled,
            allocated: reconciled.allocated,
            discarded: reconciled.discarded.len(),
            loads: reconciled.loads.len(),
        };
        debug!(
            columns = ?window.columns,
            rows = ?window.rows,
            scale = self.viewport.scale(),
            loads = report.loads,
            "layout pass"
        );
        self.window = window;
        report
    }

    fn issue(&mut self, request: LoadRequest) {
        let identity = self.identities.identity_for(request.coordinate);
        let locator = self.identities.locator_for(identity);
        self.loader.issue(request, FetchRequest { identity, locator });
        self.stats.loads_issued += 1;
    }

    fn apply(&mut self, completion: Completion) -> CompletionOutcome {
        let outcome = self.pool.apply_completion(completion);
        match outcome {
            CompletionOutcome::Applied => self.stats.applied += 1,
            CompletionOutcome::Failed(_) => self.stats.failed += 1,
            CompletionOutcome::Stale => self.stats.stale += 1,
        }
        outcome
    }
}
