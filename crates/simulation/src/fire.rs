//! Fire station coverage.

use crate::context::SimContext;
use crate::overlays::OverlayKind;

/// Spread the station strength deposited by the map scan and publish it as
/// coverage for fire behavior to read.
pub fn fire_analysis(ctx: &mut SimContext) {
    for _ in 0..3 {
        ctx.overlays.fire_station.smooth_in_place();
    }
    ctx.overlays.fire_coverage = ctx.overlays.fire_station.clone();
    ctx.outbox.overlay_changed(OverlayKind::FireCoverage);
}
