//! Stable per-coordinate identities for fetched content.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::coord::GridCoordinate;
use crate::error::ConfigError;
use crate::segmented::SegmentedGrid;

/// Opaque content identity handed to the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub u64);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps grid coordinates to the identity of the content shown there.
pub trait IdentitySource {
    /// Identity for `coord`. Must return the same value for the same
    /// coordinate for the life of the source.
    fn identity_for(&mut self, coord: GridCoordinate) -> Identity;

    /// Locator string the fetcher resolves for `identity`.
    fn locator_for(&self, identity: Identity) -> String {
        identity.to_string()
    }
}

/// Hands out `0, 1, 2, …` in first-visit order and remembers the assignment.
pub struct StableIdentitySource {
    assigned: SegmentedGrid<u64>,
    next_id: u64,
    url_template: String,
}

impl StableIdentitySource {
    /// # Errors
    /// Returns [`ConfigError::SegmentSize`] when `segment_size` is zero.
    pub fn new(segment_size: u32, url_template: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            assigned: SegmentedGrid::new(segment_size)?,
            next_id: 0,
            url_template: url_template.into(),
        })
    }

    /// # Errors
    /// Returns [`ConfigError::SegmentSize`] when the configured segment size is zero.
    pub fn from_config(config: &GridConfig) -> Result<Self, ConfigError> {
        Self::new(config.segment_size, config.url_template.clone())
    }

    /// Identity already assigned to `coord`, without assigning one.
    pub fn peek(&self, coord: GridCoordinate) -> Option<Identity> {
        self.assigned.get(coord).copied().map(Identity)
    }

    /// Number of identities handed out so far.
    pub fn assigned_count(&self) -> u64 {
        self.next_id
    }

    /// Segments allocated by the backing store.
    pub fn segment_count(&self) -> usize {
        self.assigned.segment_count()
    }
}

impl IdentitySource for StableIdentitySource {
    fn identity_for(&mut self, coord: GridCoordinate) -> Identity {
        let next_id = &mut self.next_id;
        let id = self.assigned.get_or_insert_with(coord, || {
            let id = *next_id;
            *next_id += 1;
            id
        });
        Identity(*id)
    }

    /// Expands `{id}` in the configured template.
    fn locator_for(&self, identity: Identity) -> String {
        self.url_template.replace("{id}", &identity.to_string())
    }
}
