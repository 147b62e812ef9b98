//! Crime scan: police coverage smoothing and the crime overlay.

use crate::context::SimContext;
use crate::geometry::CityLocation;
use crate::overlays::OverlayKind;

/// Spread station strength three times and publish it as police coverage.
pub fn police_coverage_scan(ctx: &mut SimContext) {
    for _ in 0..3 {
        ctx.overlays.police_station.smooth_in_place();
    }
    ctx.overlays.police_coverage = ctx.overlays.police_station.clone();
    ctx.outbox.overlay_changed(OverlayKind::PoliceCoverage);
}

pub fn crime_scan(ctx: &mut SimContext) {
    police_coverage_scan(ctx);

    let overlays = &mut *ctx.overlays;
    let mut count = 0;
    let mut total = 0;
    let mut max = 0;
    for hx in 0..overlays.crime.width() {
        for hy in 0..overlays.crime.height() {
            let value = overlays.land_value.get(hx, hy);
            if value == 0 {
                overlays.crime.set(hx, hy, 0);
                continue;
            }
            let (wx, wy) = (hx * 2, hy * 2);
            let mut z = (128 - value + overlays.population_density.get(hx, hy)).min(300);
            z -= overlays.police_coverage.world_get(wx, wy);
            let z = z.clamp(0, 250);
            overlays.crime.set(hx, hy, z);
            count += 1;
            total += z;
            if z > max || (z == max && ctx.rng.one_in(4)) {
                max = z;
                overlays.crime_max = CityLocation::new(wx, wy);
            }
        }
    }
    overlays.crime_average = if count != 0 { total / count } else { 0 };
    ctx.outbox.overlay_changed(OverlayKind::Crime);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;

    #[test]
    fn test_crime_follows_poverty_and_density() {
        let mut state = CityState::new(1);
        state.overlays.land_value.set(10, 10, 20);
        state.overlays.population_density.set(10, 10, 100);
        state.overlays.land_value.set(30, 30, 200);
        crime_scan(&mut state.ctx());
        assert_eq!(state.overlays.crime.get(10, 10), 208);
        assert_eq!(state.overlays.crime.get(30, 30), 0);
        assert_eq!(state.overlays.crime.get(0, 0), 0);
        assert_eq!(state.overlays.crime_max, CityLocation::new(20, 20));
        assert_eq!(state.overlays.crime_average, 104);
    }

    #[test]
    fn test_police_lower_crime() {
        let mut state = CityState::new(1);
        state.overlays.land_value.set(10, 10, 20);
        state.overlays.population_density.set(10, 10, 100);
        state.overlays.police_station.world_set(20, 20, 1000);
        crime_scan(&mut state.ctx());
        assert!(state.overlays.police_coverage.world_get(20, 20) > 0);
        assert!(state.overlays.crime.get(10, 10) < 208);
    }
}
