//! Asset extraction from resident bundles

use super::handle::AssetHandle;
use super::source::BundleSource;
use crate::core::CacheStats;

/// Pull `name` out of `bundle`, logging a miss. The bundle stays cached either way.
pub(crate) fn extract_asset<S: BundleSource>(
    source: &S,
    bundle: &S::Bundle,
    name: &str,
    stats: &mut CacheStats,
) -> Option<AssetHandle<S::Asset>> {
    let asset = source.extract_asset(bundle, name);
    if asset.is_none() {
        stats.extract_failures += 1;
        log::error!("Asset '{name}' not found in its bundle");
    }
    asset
}
