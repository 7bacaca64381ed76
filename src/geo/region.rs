//! One-way sync guard between a map widget and the bound region value.
//!
//! The map reports `will change` / `did change` for every camera move,
//! whether the app or the user caused it. Only user gestures may write the
//! new region back to the bound value; writing back a region the app itself
//! set would re-enter the update and loop.

use crate::geo::MapRegion;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    /// The app moved the camera; the next did-change is not written back.
    ProgrammaticUpdate,
    /// The user is panning or zooming; the next did-change is written back.
    UserDriven,
}

/// Per-screen region sync state machine.
#[derive(Debug, Clone, Default)]
pub struct RegionSync {
    state: SyncState,
    region: Option<MapRegion>,
}

impl RegionSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Last region applied or written back.
    pub fn region(&self) -> Option<MapRegion> {
        self.region
    }

    /// The app moves the camera. Returns the region to apply to the widget.
    pub fn set_region(&mut self, region: MapRegion) -> MapRegion {
        self.state = SyncState::ProgrammaticUpdate;
        self.region = Some(region);
        region
    }

    /// Widget callback before the camera moves.
    ///
    /// Gestures arrive without animation; animated moves out of `Idle` are
    /// treated as app-driven. A gesture also takes over a pending app move,
    /// since the widget stays silent when `set_region` changes nothing.
    /// Other callbacks during an ongoing move are ignored.
    pub fn region_will_change(&mut self, animated: bool) {
        self.state = match (self.state, animated) {
            (SyncState::Idle, true) => SyncState::ProgrammaticUpdate,
            (SyncState::Idle | SyncState::ProgrammaticUpdate, false) => SyncState::UserDriven,
            (state, _) => state,
        };
    }

    /// Widget callback after the camera settled. Returns the region to write
    /// back to the bound value, which happens only for user-driven moves.
    pub fn region_did_change(&mut self, region: MapRegion) -> Option<MapRegion> {
        let previous = std::mem::take(&mut self.state);
        match previous {
            SyncState::UserDriven => {
                self.region = Some(region);
                Some(region)
            }
            SyncState::ProgrammaticUpdate | SyncState::Idle => None,
        }
    }
}
