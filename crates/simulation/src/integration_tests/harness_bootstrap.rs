use crate::config::STARTING_FUNDS;
use crate::speed::SimSpeed;
use crate::test_harness::TestCity;
use crate::tiles::DIRT;
use crate::TickCounter;

#[test]
fn test_empty_city_is_bare_dirt() {
    let city = TestCity::new();
    assert!(city.map().iter().all(|(_, _, cell)| cell == DIRT));
    assert_eq!(city.map().width(), 120);
    assert_eq!(city.map().height(), 100);
}

#[test]
fn test_empty_city_has_easy_starting_funds() {
    let city = TestCity::new();
    city.assert_funds(STARTING_FUNDS[0]);
}

#[test]
fn test_empty_city_has_no_sprites_or_population() {
    let city = TestCity::new();
    assert!(city.sprites().is_empty());
    assert_eq!(city.census().city_population(), 0);
}

#[test]
fn test_tick_advances_counter_and_clock() {
    let mut city = TestCity::new().with_disasters(false);
    city.tick(64);
    assert_eq!(city.resource::<TickCounter>().0, 64);
    assert_eq!(city.clock().city_time, 2);
}

#[test]
fn test_paused_city_does_not_step() {
    let mut city = TestCity::new().with_speed(SimSpeed::Paused);
    city.tick(100);
    assert_eq!(city.clock().acycle, 0);
    assert_eq!(city.clock().city_time, 0);
}

#[test]
fn test_super_fast_runs_five_steps_per_tick() {
    let mut city = TestCity::new()
        .with_disasters(false)
        .with_speed(SimSpeed::SuperFast);
    city.tick(10);
    assert_eq!(city.clock().acycle, 50);
}
