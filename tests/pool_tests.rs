//! Cell pool tests
//!
//! Reconciliation keeps cells whose coordinate stays visible, recycles the
//! rest, never grows past the largest window, and only applies completions
//! whose token is still current.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use infigrid::content::{Completion, CompletionOutcome};
use infigrid::{
    compute_window, CellPool, FetchError, GridConfig, GridCoordinate, LoadState, PixelRect,
    ViewportState, VisibleWindow,
};

fn unit_geometry(coord: GridCoordinate) -> PixelRect {
    PixelRect::new(coord.column * 10, coord.row * 10, 10, 10)
}

fn tile() -> Arc<image::RgbaImage> {
    Arc::new(image::RgbaImage::new(2, 2))
}

/// Live bindings must be a bijection onto the window.
fn assert_exact_cover(pool: &CellPool, window: &VisibleWindow) {
    assert_eq!(pool.len(), window.len());
    let mut ids = HashSet::new();
    for coord in window.iter() {
        let cell = pool.cell_at(coord).expect("window coordinate without a cell");
        assert_eq!(cell.coordinate(), coord);
        assert!(ids.insert(cell.id()), "cell {} bound twice", cell.id());
    }
    assert_eq!(pool.cells().count(), window.len());
}

mod churn_tests {
    use super::*;

    #[test]
    fn test_overlap_keeps_cell_ids() {
        let mut pool = CellPool::new();
        let w1 = VisibleWindow::new(0..10, 0..8);
        pool.reconcile(&w1, unit_geometry);
        let before: HashMap<GridCoordinate, _> =
            w1.iter().map(|c| (c, pool.cell_at(c).unwrap().id())).collect();

        let w2 = VisibleWindow::new(3..13, -2..6);
        let report = pool.reconcile(&w2, unit_geometry);

        let overlap: Vec<_> = w1.iter().filter(|c| w2.contains(*c)).collect();
        assert_eq!(report.retained, overlap.len());
        for coord in &overlap {
            assert_eq!(pool.cell_at(*coord).unwrap().id(), before[coord]);
        }
        // Only coordinates new to the window are loaded.
        assert_eq!(report.reloads(), w2.len() - overlap.len());
        assert!(report.loads.iter().all(|load| !w1.contains(load.coordinate)));
        assert_eq!(report.recycled, report.reloads());
        assert_eq!(report.allocated, 0);
        assert_exact_cover(&pool, &w2);
    }

    #[test]
    fn test_retained_cells_keep_token_and_image() {
        let mut pool = CellPool::new();
        let w1 = VisibleWindow::new(0..4, 0..4);
        let first = pool.reconcile(&w1, unit_geometry);
        for load in first.loads {
            pool.apply_completion(Completion {
                cell: load.cell,
                token: load.token,
                result: Ok(tile()),
            });
        }
        let coord = GridCoordinate::new(2, 2);
        let token = pool.cell_at(coord).unwrap().token();

        pool.reconcile(&VisibleWindow::new(1..5, 1..5), |c| {
            PixelRect::new(c.column * 10 - 3, c.row * 10, 10, 10)
        });
        let cell = pool.cell_at(coord).unwrap();
        assert_eq!(cell.token(), token);
        assert_eq!(cell.state(), LoadState::Applied);
        assert!(cell.image().is_some());
        assert_eq!(cell.frame(), PixelRect::new(17, 20, 10, 10));
    }

    #[test]
    fn test_recycled_cells_start_blank() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..2, 0..1), unit_geometry);
        for load in first.loads {
            pool.apply_completion(Completion {
                cell: load.cell,
                token: load.token,
                result: Ok(tile()),
            });
        }
        let report = pool.reconcile(&VisibleWindow::new(100..102, 0..1), unit_geometry);
        assert_eq!(report.recycled, 2);
        for cell in pool.cells() {
            assert_eq!(cell.state(), LoadState::Loading);
            assert!(cell.image().is_none());
        }
    }

    #[test]
    fn test_surplus_is_handed_out_in_row_major_order() {
        let mut pool = CellPool::new();
        pool.reconcile(&VisibleWindow::new(0..2, 0..2), unit_geometry);
        let id_at = |pool: &CellPool, c, r| pool.cell_at(GridCoordinate::new(c, r)).unwrap().id();
        let order = [
            id_at(&pool, 0, 0),
            id_at(&pool, 1, 0),
            id_at(&pool, 0, 1),
            id_at(&pool, 1, 1),
        ];

        pool.reconcile(&VisibleWindow::new(10..12, 10..12), unit_geometry);
        assert_eq!(id_at(&pool, 10, 10), order[0]);
        assert_eq!(id_at(&pool, 11, 10), order[1]);
        assert_eq!(id_at(&pool, 10, 11), order[2]);
        assert_eq!(id_at(&pool, 11, 11), order[3]);
    }
}

mod boundedness_tests {
    use super::*;

    #[test]
    fn test_long_pan_never_grows_pool() {
        let mut vp = ViewportState::new(&GridConfig::default());
        vp.resize(800.0, 600.0);
        let mut pool = CellPool::new();
        let mut largest = 0;

        let mut total_allocated = 0;
        for step in 0..2_000 {
            let t = f64::from(step);
            vp.on_pan_delta(-t * 3.7, t * 1.3);
            let window = compute_window(&vp, 120.0);
            largest = largest.max(window.len());
            let report = pool.reconcile(&window, |c| vp.rect_for(c));
            total_allocated += report.allocated;
            assert_exact_cover(&pool, &window);
            assert!(pool.capacity() <= largest);
        }
        // Window size is fixed for a fixed scale, so only the first pass allocates.
        assert_eq!(total_allocated, largest);
    }

    #[test]
    fn test_zoom_out_then_in_reuses_arena() {
        let mut vp = ViewportState::new(&GridConfig::default());
        vp.resize(800.0, 600.0);
        let mut pool = CellPool::new();

        vp.on_zoom_delta(0.5);
        let wide = compute_window(&vp, 0.0);
        pool.reconcile(&wide, |c| vp.rect_for(c));
        let peak = pool.capacity();

        vp.on_zoom_delta(4.0);
        let narrow = compute_window(&vp, 0.0);
        let report = pool.reconcile(&narrow, |c| vp.rect_for(c));
        assert!(!report.discarded.is_empty());
        assert_eq!(pool.len(), narrow.len());

        vp.on_zoom_delta(0.5);
        pool.reconcile(&compute_window(&vp, 0.0), |c| vp.rect_for(c));
        assert_eq!(pool.capacity(), peak);
    }
}

mod staleness_tests {
    use super::*;

    #[test]
    fn test_rebound_cell_ignores_old_completion() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..1, 0..1), unit_geometry);
        let old = first.loads[0];

        let second = pool.reconcile(&VisibleWindow::new(5..6, 0..1), unit_geometry);
        let new = second.loads[0];
        assert_eq!(new.cell, old.cell, "the single cell is recycled");
        assert!(new.token > old.token);

        let outcome = pool.apply_completion(Completion {
            cell: old.cell,
            token: old.token,
            result: Ok(tile()),
        });
        assert!(matches!(outcome, CompletionOutcome::Stale));
        let cell = pool.cell(new.cell).unwrap();
        assert_eq!(cell.coordinate(), GridCoordinate::new(5, 0));
        assert_eq!(cell.state(), LoadState::Loading);
        assert!(cell.image().is_none());
    }

    #[test]
    fn test_stale_failure_does_not_blank_cell() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..1, 0..1), unit_geometry);
        let old = first.loads[0];
        let reload = pool.reload(GridCoordinate::ORIGIN).unwrap();
        pool.apply_completion(Completion {
            cell: reload.cell,
            token: reload.token,
            result: Ok(tile()),
        });

        let outcome = pool.apply_completion(Completion {
            cell: old.cell,
            token: old.token,
            result: Err(FetchError::Status(500)),
        });
        assert!(matches!(outcome, CompletionOutcome::Stale));
        assert_eq!(pool.cell(old.cell).unwrap().state(), LoadState::Applied);
    }

    #[test]
    fn test_completion_for_discarded_cell_is_stale() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..3, 0..1), unit_geometry);
        let report = pool.reconcile(&VisibleWindow::new(0..1, 0..1), unit_geometry);
        assert_eq!(report.discarded.len(), 2);

        let gone = first
            .loads
            .iter()
            .find(|load| report.discarded.contains(&load.cell))
            .copied()
            .unwrap();
        let outcome = pool.apply_completion(Completion {
            cell: gone.cell,
            token: gone.token,
            result: Ok(tile()),
        });
        assert!(matches!(outcome, CompletionOutcome::Stale));
    }

    #[test]
    fn test_current_failure_blanks_cell() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..1, 0..1), unit_geometry);
        let load = first.loads[0];
        let outcome = pool.apply_completion(Completion {
            cell: load.cell,
            token: load.token,
            result: Err(FetchError::Transport("reset by peer".into())),
        });
        assert!(matches!(outcome, CompletionOutcome::Failed(FetchError::Transport(_))));
        let cell = pool.cell(load.cell).unwrap();
        assert_eq!(cell.state(), LoadState::Failed);
        assert!(cell.image().is_none());
    }

    #[test]
    fn test_reload_all_mints_fresh_tokens() {
        let mut pool = CellPool::new();
        let first = pool.reconcile(&VisibleWindow::new(0..3, 0..2), unit_geometry);
        let reloads = pool.reload_all();
        assert_eq!(reloads.len(), 6);
        let old: HashSet<_> = first.loads.iter().map(|l| l.token).collect();
        assert!(reloads.iter().all(|l| !old.contains(&l.token)));
        let coords: Vec<_> = reloads.iter().map(|l| l.coordinate).collect();
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
    }

    #[test]
    fn test_reload_of_unbound_coordinate() {
        let mut pool = CellPool::new();
        pool.reconcile(&VisibleWindow::new(0..1, 0..1), unit_geometry);
        assert!(pool.reload(GridCoordinate::new(9, 9)).is_none());
    }
}
