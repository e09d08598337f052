//! Per-asset load tracking
//!
//! Every asset the client loads degrades on its own: only the scene gates gameplay.

use bevy::asset::{RecursiveDependencyLoadState, UntypedAssetId};
use bevy::prelude::*;

/// Load state of a single asset (including its dependencies)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssetStatus {
    #[default]
    Pending,
    Loaded,
    Failed,
}

impl AssetStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, AssetStatus::Pending)
    }
}

/// Current status of `handle`, logging the failure reason once it is known.
pub fn poll_asset<A: Asset>(asset_server: &AssetServer, handle: &Handle<A>, label: &str) -> AssetStatus {
    match asset_server.get_recursive_dependency_load_state(handle) {
        Some(RecursiveDependencyLoadState::Loaded) => AssetStatus::Loaded,
        Some(RecursiveDependencyLoadState::Failed(err)) => {
            warn!("Failed to load {}: {}", label, err);
            AssetStatus::Failed
        }
        _ => AssetStatus::Pending,
    }
}

/// Update `status` from the asset server unless it already settled. Returns true when
/// the status changed this call.
pub fn refresh_status<A: Asset>(
    status: &mut AssetStatus,
    asset_server: &AssetServer,
    handle: &Handle<A>,
    label: &str,
) -> bool {
    if status.is_settled() {
        return false;
    }
    let next = poll_asset(asset_server, handle, label);
    if next != *status {
        *status = next;
        return true;
    }
    false
}

/// Has this asset (and everything it depends on) finished, either way?
pub fn is_settled(asset_server: &AssetServer, id: impl Into<UntypedAssetId>) -> bool {
    matches!(
        asset_server.get_recursive_dependency_load_state(id),
        Some(RecursiveDependencyLoadState::Loaded | RecursiveDependencyLoadState::Failed(_))
    )
}

/// Whole-number percentage of settled assets. Nothing to load counts as done.
pub fn load_percent(settled: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (settled.min(total) * 100 / total) as u32
}
