//! Properties that must hold on any city after any number of ticks.

use crate::test_harness::TestCity;
use crate::tools::Tool;

#[test]
fn test_generated_city_keeps_valid_state_over_many_ticks() {
    let mut city = TestCity::generated(31).with_funds(50_000);
    for (tool, x, y) in [
        (Tool::CoalPower, 60, 50),
        (Tool::Residential, 66, 50),
        (Tool::Industrial, 60, 56),
        (Tool::Road, 64, 52),
        (Tool::Rail, 64, 54),
    ] {
        city.apply_tool(tool, x, y);
    }

    for _ in 0..20 {
        city.tick(100);
        city.assert_cells_valid();

        let clock = city.clock();
        assert!(clock.phase_cycle < 16);
        assert!(clock.sim_cycle < 1024);

        let (w, h) = (city.map().width(), city.map().height());
        for sprite in city.sprites().sprites.iter() {
            assert!(sprite.is_visible(), "dead sprite left in the list");
            let (tx, ty) = (sprite.tile_x(), sprite.tile_y());
            assert!(
                (-8..w + 8).contains(&tx) && (-8..h + 8).contains(&ty),
                "{:?} wandered to ({tx}, {ty})",
                sprite.kind()
            );
        }
    }
}

#[test]
fn test_city_time_tracks_ticks() {
    let mut city = TestCity::new().with_disasters(false);
    city.tick(32 * 48);
    assert_eq!(city.clock().city_time, 48);
    assert_eq!(city.clock().year(), 1901);
    assert_eq!(city.clock().month(), 0);
}
