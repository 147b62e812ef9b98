//! Tile numbering and cell bit layout.
//!
//! A map cell is a `u16`: the low ten bits hold the tile number and bit 15
//! marks the cell as currently powered. Every other per-tile attribute lives
//! in the [`TileRegistry`] loaded from `tiles.rc`.

pub mod spec;

pub use spec::{Behavior, BuildingInfo, TileRegistry, TileSpec, TileSpecError};

/// Bits isolating the tile number from status flags.
pub const LOMASK: u16 = 0x03ff;
/// Cell is powered.
pub const PWRBIT: u16 = 0x8000;

// Export-only flags synthesized from the tile spec when writing a city file.
pub const CONDBIT: u16 = 0x4000;
pub const BURNBIT: u16 = 0x2000;
pub const BULLBIT: u16 = 0x1000;
pub const ANIMBIT: u16 = 0x0800;
pub const ZONEBIT: u16 = 0x0400;

pub const TILE_COUNT: usize = 960;
pub const LAST_TILE: u16 = (TILE_COUNT - 1) as u16;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

pub const DIRT: u16 = 0;
pub const RIVER: u16 = 2;
pub const REDGE: u16 = 3;
pub const CHANNEL: u16 = 4;
pub const FIRSTRIVEDGE: u16 = 5;
pub const LASTRIVEDGE: u16 = 20;
pub const WATER_LOW: u16 = RIVER;
pub const WATER_HIGH: u16 = LASTRIVEDGE;

pub const TREEBASE: u16 = 21;
pub const WOODS_LOW: u16 = TREEBASE;
pub const WOODS: u16 = 37;
pub const WOODS_HIGH: u16 = 39;
pub const WOODS2: u16 = 40;
pub const WOODS5: u16 = 43;

pub const RUBBLE: u16 = 44;
pub const LASTRUBBLE: u16 = 47;
pub const FLOOD: u16 = 48;
pub const LASTFLOOD: u16 = 51;
pub const RADTILE: u16 = 52;
pub const FIRE: u16 = 56;
pub const LASTFIRE: u16 = 63;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

pub const ROADBASE: u16 = 64;
pub const HBRIDGE: u16 = 64;
pub const VBRIDGE: u16 = 65;
pub const ROADS: u16 = 66;
pub const ROADS2: u16 = 67;
pub const ROADS3: u16 = 68;
pub const ROADS4: u16 = 69;
pub const ROADS5: u16 = 70;
pub const ROADS6: u16 = 71;
pub const ROADS7: u16 = 72;
pub const ROADS8: u16 = 73;
pub const ROADS9: u16 = 74;
pub const ROADS10: u16 = 75;
pub const INTERSECTION: u16 = 76;
pub const HROADPOWER: u16 = 77;
pub const VROADPOWER: u16 = 78;
pub const BRWH: u16 = 79;
pub const LTRFBASE: u16 = 80;
pub const BRWV: u16 = 95;
pub const HTRFBASE: u16 = 144;
pub const LASTROAD: u16 = 206;

pub const POWERBASE: u16 = 208;
pub const HPOWER: u16 = 208;
pub const VPOWER: u16 = 209;
pub const LHPOWER: u16 = 210;
pub const LVPOWER: u16 = 211;
pub const LVPOWER2: u16 = 212;
pub const LVPOWER3: u16 = 213;
pub const LVPOWER4: u16 = 214;
pub const LVPOWER5: u16 = 215;
pub const LVPOWER6: u16 = 216;
pub const LVPOWER7: u16 = 217;
pub const LVPOWER8: u16 = 218;
pub const LVPOWER9: u16 = 219;
pub const LVPOWER10: u16 = 220;
pub const RAILHPOWERV: u16 = 221;
pub const RAILVPOWERH: u16 = 222;
pub const LASTPOWER: u16 = 222;

pub const RAILBASE: u16 = 224;
pub const HRAIL: u16 = 224;
pub const VRAIL: u16 = 225;
pub const LHRAIL: u16 = 226;
pub const LVRAIL: u16 = 227;
pub const LVRAIL2: u16 = 228;
pub const LVRAIL3: u16 = 229;
pub const LVRAIL4: u16 = 230;
pub const LVRAIL5: u16 = 231;
pub const LVRAIL6: u16 = 232;
pub const LVRAIL7: u16 = 233;
pub const LVRAIL8: u16 = 234;
pub const LVRAIL9: u16 = 235;
pub const LVRAIL10: u16 = 236;
pub const HRAILROAD: u16 = 237;
pub const VRAILROAD: u16 = 238;
pub const LASTRAIL: u16 = 238;

// ---------------------------------------------------------------------------
// Zones and buildings
// ---------------------------------------------------------------------------

pub const RESBASE: u16 = 240;
pub const FREEZ: u16 = 244;
pub const HOUSE: u16 = 249;
pub const LHTHR: u16 = 249;
pub const HHTHR: u16 = 260;
pub const RZB: u16 = 265;
pub const HOSPITALBASE: u16 = 405;
pub const HOSPITAL: u16 = 409;
pub const CHURCHBASE: u16 = 414;
pub const CHURCH: u16 = 418;
pub const COMBASE: u16 = 423;
pub const COMCLR: u16 = 427;
pub const CZB: u16 = 436;
pub const COMLAST: u16 = 611;
pub const INDBASE: u16 = 612;
pub const INDCLR: u16 = 616;
pub const LASTIND: u16 = 620;
pub const IZB: u16 = 625;
pub const PORTBASE: u16 = 693;
pub const PORT: u16 = 698;
pub const AIRPORTBASE: u16 = 709;
pub const RADAR: u16 = 711;
pub const AIRPORT: u16 = 716;
pub const COALBASE: u16 = 745;
pub const POWERPLANT: u16 = 750;
pub const LASTPOWERPLANT: u16 = 760;
pub const FIRESTBASE: u16 = 761;
pub const FIRESTATION: u16 = 765;
pub const POLICESTBASE: u16 = 770;
pub const POLICESTATION: u16 = 774;
pub const STADIUMBASE: u16 = 779;
pub const STADIUM: u16 = 784;
pub const FULLSTADIUMBASE: u16 = 795;
pub const FULLSTADIUM: u16 = 800;
pub const NUCLEARBASE: u16 = 811;
pub const NUCLEAR: u16 = 816;
pub const LASTZONE: u16 = 826;

pub const LIGHTNINGBOLT: u16 = 827;
pub const HBRDG0: u16 = 828;
pub const HBRDG1: u16 = 829;
pub const HBRDG2: u16 = 830;
pub const HBRDG3: u16 = 831;
pub const RADAR0: u16 = 832;
pub const FOUNTAIN: u16 = 840;
pub const TINYEXP: u16 = 860;
pub const SOMETINYEXP: u16 = 864;
pub const LASTTINYEXP: u16 = 867;
pub const COALSMOKE1: u16 = 916;
pub const FOOTBALLGAME1: u16 = 932;
pub const FOOTBALLGAME2: u16 = 940;
pub const VBRDG0: u16 = 948;
pub const VBRDG1: u16 = 949;
pub const VBRDG2: u16 = 950;
pub const VBRDG3: u16 = 951;

// ---------------------------------------------------------------------------
// Range predicates on bare tile numbers
// ---------------------------------------------------------------------------

#[inline]
pub fn tile_of(cell: u16) -> u16 {
    cell & LOMASK
}

pub fn is_water(tile: u16) -> bool {
    (WATER_LOW..=WATER_HIGH).contains(&tile)
}

pub fn is_river_edge(tile: u16) -> bool {
    (FIRSTRIVEDGE..=LASTRIVEDGE).contains(&tile)
}

pub fn is_tree(tile: u16) -> bool {
    (WOODS_LOW..=WOODS_HIGH).contains(&tile)
}

pub fn is_rubble(tile: u16) -> bool {
    (RUBBLE..=LASTRUBBLE).contains(&tile)
}

pub fn is_fire(tile: u16) -> bool {
    (FIRE..=LASTFIRE).contains(&tile)
}

pub fn is_road(tile: u16) -> bool {
    (ROADBASE..=LASTROAD).contains(&tile)
}

pub fn is_rail(tile: u16) -> bool {
    (RAILBASE..=LASTRAIL).contains(&tile)
}

pub fn is_wire(tile: u16) -> bool {
    (POWERBASE..=LASTPOWER).contains(&tile)
}

/// Rubble, flood, radiation and fire: tiles a zone repair never paints over.
pub fn is_indestructible(tile: u16) -> bool {
    (RUBBLE..ROADBASE).contains(&tile)
}

/// Tiles a car can drive on: roads, rail crossings and the power/road mixes,
/// excluding bare power lines.
pub fn is_drivable(tile: u16) -> bool {
    if !(ROADBASE..=LASTRAIL).contains(&tile) {
        return false;
    }
    !(POWERBASE..LASTPOWER).contains(&tile)
}

pub fn is_bridge(tile: u16) -> bool {
    matches!(tile, HBRIDGE | VBRIDGE | BRWH | BRWV)
        || (is_road(tile) && tile >= LTRFBASE && ((tile - ROADBASE) & 15) < 2)
}

/// Orientation index of a road tile within its 16-tile traffic block.
pub fn road_orientation(tile: u16) -> u16 {
    (tile.saturating_sub(ROADBASE)) & 15
}

/// Traffic bucket of a road tile: 0 none, 1 light, 2 heavy.
pub fn road_traffic_level(tile: u16) -> u8 {
    if tile < LTRFBASE {
        0
    } else if tile < HTRFBASE {
        1
    } else {
        2
    }
}

pub fn random_rubble(r: u16) -> u16 {
    RUBBLE + (r & 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lomask_strips_power_bit() {
        assert_eq!(tile_of(PWRBIT | POWERPLANT), POWERPLANT);
        assert_eq!(LAST_TILE, 959);
    }

    #[test]
    fn test_drivable_excludes_power_lines() {
        assert!(is_drivable(ROADS));
        assert!(is_drivable(HRAILROAD));
        assert!(is_drivable(LHRAIL));
        assert!(!is_drivable(LHPOWER));
        assert!(!is_drivable(DIRT));
        assert!(!is_drivable(RESBASE));
    }

    #[test]
    fn test_road_orientation_survives_traffic_level() {
        assert_eq!(road_orientation(ROADS), road_orientation(ROADS + 16));
        assert_eq!(road_orientation(ROADS), road_orientation(ROADS + 80));
        assert_eq!(road_traffic_level(ROADS), 0);
        assert_eq!(road_traffic_level(ROADS + 16), 1);
        assert_eq!(road_traffic_level(ROADS + 80), 2);
    }

    #[test]
    fn test_bridge_detection() {
        assert!(is_bridge(HBRIDGE));
        assert!(is_bridge(BRWV));
        assert!(is_bridge(LTRFBASE));
        assert!(!is_bridge(ROADS));
    }
}
