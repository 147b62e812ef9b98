use crate::terrain_generation::{IslandMode, MapGenConfig};
use crate::test_harness::TestCity;
use crate::tiles::{is_water, tile_of, DIRT};

#[test]
fn test_flat_config_generates_bare_dirt() {
    let city = TestCity::generated_with(9, MapGenConfig::flat());
    assert!(city.map().iter().all(|(_, _, cell)| cell == DIRT));
}

#[test]
fn test_island_is_ringed_by_water() {
    let config = MapGenConfig {
        island: IslandMode::Always,
        ..MapGenConfig::default()
    };
    let city = TestCity::generated_with(9, config);
    for (x, y) in [(0, 0), (119, 0), (0, 99), (119, 99), (60, 1), (2, 50)] {
        let tile = city.tile(x, y);
        assert!(is_water(tile), "({x}, {y}) is {tile}, not water");
    }
    let land = city
        .map()
        .iter()
        .filter(|&(_, _, c)| !is_water(tile_of(c)))
        .count();
    assert!(land > 1000, "island too small: {land} land tiles");
    city.assert_cells_valid();
}

#[test]
fn test_generated_city_starts_fresh() {
    let city = TestCity::generated(4);
    assert_eq!(city.clock().city_time, 0);
    assert!(city.sprites().is_empty());
    city.assert_cells_valid();
}
