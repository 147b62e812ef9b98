use crate::test_harness::TestCity;
use crate::tools::Tool;

/// Coal plant at (10, 10), a wire east along y = 10, a residential zone
/// centred on (22, 10).
fn wired_city() -> TestCity {
    TestCity::new()
        .with_disasters(false)
        .with_tool(Tool::CoalPower, 10, 10)
        .with_line(Tool::Wire, 13, 10, 20, 10)
        .with_tool(Tool::Residential, 22, 10)
}

#[test]
fn test_wire_carries_power_to_zone() {
    let mut city = wired_city();
    city.tick(320);
    assert!(city.map().is_powered(22, 10), "zone never got power");
    assert!(city.overlays().power_grid.get(16, 10));
}

#[test]
fn test_cut_wire_unpowers_zone() {
    let mut city = wired_city();
    city.tick(320);
    assert!(city.map().is_powered(22, 10));

    let mut city = city.with_tool(Tool::Bulldozer, 16, 10);
    city.tick(320);
    assert!(!city.overlays().power_grid.get(20, 10));
    assert!(!city.map().is_powered(22, 10), "zone kept power after the cut");
}

#[test]
fn test_unconnected_zone_stays_dark() {
    let mut city = TestCity::new()
        .with_disasters(false)
        .with_tool(Tool::CoalPower, 10, 10)
        .with_tool(Tool::Residential, 40, 40);
    city.tick(320);
    assert!(!city.map().is_powered(40, 40));
    // The plant powers itself.
    assert!(city.map().is_powered(10, 10));
}
