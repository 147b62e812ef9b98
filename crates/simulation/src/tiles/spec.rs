//! Tile spec registry.
//!
//! The registry is an arena of [`TileSpec`] indexed by tile number. It is
//! built in two passes: the text is parsed into raw attribute maps (with
//! supertype inheritance merged in), then every relation (`next`, `onpower`,
//! `onshutdown`, building members and their owners) is resolved into tile
//! indices. Any problem in either pass fails the whole load.

use std::collections::BTreeMap;
use std::fmt;

use bevy::prelude::*;

use super::{ANIMBIT, BULLBIT, BURNBIT, CONDBIT, LOMASK, TILE_COUNT, ZONEBIT};

/// The built-in table shipped with the engine.
pub const DEFAULT_TILES_RC: &str = include_str!("tiles.rc");

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSpecError {
    /// A line or token could not be parsed.
    Malformed { line: usize, reason: String },
    /// `(inherit=name)` named a supertype that was never defined.
    UnknownSupertype { line: usize, name: String },
    /// An attribute value has the wrong shape.
    BadValue {
        tile: u16,
        key: String,
        value: String,
    },
    /// A tile number outside `0..TILE_COUNT`.
    OutOfRange { line: usize, tile: u32 },
    /// A tile was defined twice.
    Duplicate { tile: u16 },
    /// A tile number in `0..TILE_COUNT` has no definition.
    Undefined { tile: u16 },
    /// A relation points at a tile that does not exist or is already owned.
    Unresolvable { tile: u16, reason: String },
}

impl fmt::Display for TileSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileSpecError::Malformed { line, reason } => {
                write!(f, "line {line}: malformed tile spec: {reason}")
            }
            TileSpecError::UnknownSupertype { line, name } => {
                write!(f, "line {line}: unknown supertype '{name}'")
            }
            TileSpecError::BadValue { tile, key, value } => {
                write!(f, "tile {tile}: bad value '{value}' for '{key}'")
            }
            TileSpecError::OutOfRange { line, tile } => {
                write!(f, "line {line}: tile number {tile} out of range")
            }
            TileSpecError::Duplicate { tile } => write!(f, "tile {tile} defined twice"),
            TileSpecError::Undefined { tile } => write!(f, "tile {tile} has no definition"),
            TileSpecError::Unresolvable { tile, reason } => {
                write!(f, "tile {tile}: unresolvable reference: {reason}")
            }
        }
    }
}

impl std::error::Error for TileSpecError {}

// =============================================================================
// Spec types
// =============================================================================

/// Per-tile reaction run by the map scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Fire,
    Flood,
    Radioactive,
    Road,
    Rail,
    Explosion,
}

impl Behavior {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "fire" => Some(Behavior::Fire),
            "flood" => Some(Behavior::Flood),
            "radioactive" => Some(Behavior::Radioactive),
            "road" => Some(Behavior::Road),
            "rail" => Some(Behavior::Rail),
            "explosion" => Some(Behavior::Explosion),
            _ => None,
        }
    }
}

/// Footprint of a multi-tile building, stored on its zone-center tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingInfo {
    pub width: u16,
    pub height: u16,
    /// Member tile numbers in row-major order, top-left first.
    pub members: Vec<u16>,
    /// Offset of the zone center inside the footprint.
    pub center: (i32, i32),
}

impl BuildingInfo {
    /// Iterate `(dx, dy, tile)` relative to the zone center.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        let w = self.width as i32;
        self.members.iter().enumerate().map(move |(i, &t)| {
            let i = i as i32;
            (i % w - self.center.0, i / w - self.center.1, t)
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TileSpec {
    pub tile: u16,
    pub name: String,
    pub images: Vec<String>,
    pub conducts: bool,
    pub burnable: bool,
    pub bulldozable: bool,
    pub overwater: bool,
    pub zone: bool,
    pub animated: bool,
    pub population: u16,
    pub pollution: u16,
    pub behavior: Option<Behavior>,
    pub next: Option<u16>,
    pub on_power: Option<u16>,
    pub on_shutdown: Option<u16>,
    pub building: Option<BuildingInfo>,
    /// Zone-center tile of the building this tile belongs to.
    pub owner: Option<u16>,
    /// Position of this member relative to its owner.
    pub owner_offset: (i32, i32),
}

// =============================================================================
// Pass 1: text -> raw attribute maps
// =============================================================================

#[derive(Debug, Clone, Default)]
struct RawSpec {
    images: Vec<String>,
    attrs: BTreeMap<String, String>,
}

enum Token<'a> {
    Attr(&'a str, &'a str),
    Image(&'a str),
}

fn tokenize(line_no: usize, rest: &str) -> Result<Vec<Token<'_>>, TileSpecError> {
    let mut out = Vec::new();
    for piece in rest.split(|c: char| c.is_whitespace() || c == '|' || c == ',') {
        if piece.is_empty() {
            continue;
        }
        if let Some(inner) = piece.strip_prefix('(') {
            let inner = inner.strip_suffix(')').ok_or_else(|| TileSpecError::Malformed {
                line: line_no,
                reason: format!("unterminated attribute '{piece}'"),
            })?;
            if inner.is_empty() || inner.contains(['(', ')']) {
                return Err(TileSpecError::Malformed {
                    line: line_no,
                    reason: format!("bad attribute '{piece}'"),
                });
            }
            let (k, v) = inner.split_once('=').unwrap_or((inner, ""));
            if k.is_empty() {
                return Err(TileSpecError::Malformed {
                    line: line_no,
                    reason: format!("empty key in '{piece}'"),
                });
            }
            out.push(Token::Attr(k, v));
        } else if piece.contains(['(', ')']) {
            return Err(TileSpecError::Malformed {
                line: line_no,
                reason: format!("stray parenthesis in '{piece}'"),
            });
        } else {
            out.push(Token::Image(piece));
        }
    }
    Ok(out)
}

fn parse_range(line_no: usize, head: &str) -> Result<(u16, u16), TileSpecError> {
    let parse = |s: &str| -> Result<u16, TileSpecError> {
        let n: u32 = s.parse().map_err(|_| TileSpecError::Malformed {
            line: line_no,
            reason: format!("bad tile number '{s}'"),
        })?;
        if n as usize >= TILE_COUNT {
            return Err(TileSpecError::OutOfRange {
                line: line_no,
                tile: n,
            });
        }
        Ok(n as u16)
    };
    let (a, b) = match head.split_once('-') {
        Some((a, b)) => (parse(a)?, parse(b)?),
        None => {
            let n = parse(head)?;
            (n, n)
        }
    };
    if b < a {
        return Err(TileSpecError::Malformed {
            line: line_no,
            reason: format!("descending range '{head}'"),
        });
    }
    Ok((a, b))
}

fn parse_raw(text: &str) -> Result<Vec<Option<RawSpec>>, TileSpecError> {
    let mut supertypes: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut raw: Vec<Option<RawSpec>> = vec![None; TILE_COUNT];

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let (name, rest) = rest.split_once(']').ok_or_else(|| TileSpecError::Malformed {
                line: line_no,
                reason: "unterminated supertype name".into(),
            })?;
            let mut attrs = BTreeMap::new();
            for tok in tokenize(line_no, rest)? {
                match tok {
                    Token::Attr("inherit", _) => {
                        return Err(TileSpecError::Malformed {
                            line: line_no,
                            reason: format!("supertype '{name}' may not inherit"),
                        });
                    }
                    Token::Attr(k, v) => {
                        attrs.insert(k.to_string(), v.to_string());
                    }
                    Token::Image(img) => {
                        return Err(TileSpecError::Malformed {
                            line: line_no,
                            reason: format!("image '{img}' on supertype '{name}'"),
                        });
                    }
                }
            }
            supertypes.insert(name.to_string(), attrs);
            continue;
        }

        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let (first, last) = parse_range(line_no, head)?;

        let mut spec = RawSpec::default();
        let mut own = BTreeMap::new();
        for tok in tokenize(line_no, rest)? {
            match tok {
                Token::Attr("inherit", name) => {
                    let base =
                        supertypes
                            .get(name)
                            .ok_or_else(|| TileSpecError::UnknownSupertype {
                                line: line_no,
                                name: name.to_string(),
                            })?;
                    for (k, v) in base {
                        spec.attrs.insert(k.clone(), v.clone());
                    }
                }
                Token::Attr(k, v) => {
                    own.insert(k.to_string(), v.to_string());
                }
                Token::Image(img) => spec.images.push(img.to_string()),
            }
        }
        // Own attributes win over inherited ones regardless of token order.
        spec.attrs.extend(own);

        for tile in first..=last {
            let slot = &mut raw[tile as usize];
            if slot.is_some() {
                return Err(TileSpecError::Duplicate { tile });
            }
            *slot = Some(spec.clone());
        }
    }
    Ok(raw)
}

// =============================================================================
// Pass 2: resolve relations
// =============================================================================

fn number(tile: u16, key: &str, value: &str) -> Result<u16, TileSpecError> {
    value.parse::<u16>().map_err(|_| TileSpecError::BadValue {
        tile,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn tile_ref(tile: u16, key: &str, value: &str) -> Result<u16, TileSpecError> {
    let n = number(tile, key, value)?;
    if n as usize >= TILE_COUNT {
        return Err(TileSpecError::Unresolvable {
            tile,
            reason: format!("{key}={n} is past the last tile"),
        });
    }
    Ok(n)
}

fn build_spec(tile: u16, raw: &RawSpec) -> Result<TileSpec, TileSpecError> {
    let mut spec = TileSpec {
        tile,
        name: raw.images.first().cloned().unwrap_or_default(),
        images: raw.images.clone(),
        ..Default::default()
    };
    for (key, value) in &raw.attrs {
        match key.as_str() {
            "conducts" => spec.conducts = true,
            "burnable" => spec.burnable = true,
            "bulldozable" => spec.bulldozable = true,
            "overwater" => spec.overwater = true,
            "zone" => spec.zone = true,
            "animated" => spec.animated = true,
            "population" => spec.population = number(tile, key, value)?,
            "pollution" => spec.pollution = number(tile, key, value)?,
            "next" => spec.next = Some(tile_ref(tile, key, value)?),
            "onpower" => spec.on_power = Some(tile_ref(tile, key, value)?),
            "onshutdown" => spec.on_shutdown = Some(tile_ref(tile, key, value)?),
            "behavior" => {
                spec.behavior =
                    Some(
                        Behavior::parse(value).ok_or_else(|| TileSpecError::BadValue {
                            tile,
                            key: key.clone(),
                            value: value.clone(),
                        })?,
                    )
            }
            // Sized after every spec exists; see `resolve_buildings`.
            "building" => {}
            other => {
                return Err(TileSpecError::BadValue {
                    tile,
                    key: other.to_string(),
                    value: value.clone(),
                })
            }
        }
    }
    if spec.next.is_some() {
        spec.animated = true;
    }
    Ok(spec)
}

fn parse_dimension(tile: u16, value: &str) -> Result<(u16, u16), TileSpecError> {
    let bad = || TileSpecError::BadValue {
        tile,
        key: "building".into(),
        value: value.to_string(),
    };
    let (w, h) = value.split_once('x').ok_or_else(bad)?;
    let w: u16 = w.parse().map_err(|_| bad())?;
    let h: u16 = h.parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(bad());
    }
    Ok((w, h))
}

fn resolve_buildings(specs: &mut [TileSpec], raw: &[RawSpec]) -> Result<(), TileSpecError> {
    for center in 0..specs.len() {
        let Some(value) = raw[center].attrs.get("building") else {
            continue;
        };
        let tile = center as u16;
        if !specs[center].zone {
            return Err(TileSpecError::Unresolvable {
                tile,
                reason: "building footprint on a tile that is not a zone center".into(),
            });
        }
        let (w, h) = parse_dimension(tile, value)?;
        let cx = if w >= 3 { 1 } else { 0 };
        let cy = if h >= 3 { 1 } else { 0 };
        let start = center as i32 - cy * w as i32 - cx;
        let count = w as i32 * h as i32;
        if start < 0 || (start + count) as usize > specs.len() {
            return Err(TileSpecError::Unresolvable {
                tile,
                reason: format!("{w}x{h} footprint runs off the tile table"),
            });
        }

        let members: Vec<u16> = (start..start + count).map(|t| t as u16).collect();
        for (i, &m) in members.iter().enumerate() {
            if m == tile {
                continue;
            }
            let member = &mut specs[m as usize];
            if member.zone || member.owner.is_some() {
                return Err(TileSpecError::Unresolvable {
                    tile,
                    reason: format!("member {m} already belongs to another building"),
                });
            }
            member.owner = Some(tile);
            member.owner_offset = (i as i32 % w as i32 - cx, i as i32 / w as i32 - cy);
        }
        specs[center].building = Some(BuildingInfo {
            width: w,
            height: h,
            members,
            center: (cx, cy),
        });
    }
    Ok(())
}

// =============================================================================
// Registry resource
// =============================================================================

/// Immutable tile attribute table, one entry per tile number.
#[derive(Resource, Debug, Clone)]
pub struct TileRegistry {
    specs: Vec<TileSpec>,
}

impl TileRegistry {
    pub fn parse(text: &str) -> Result<Self, TileSpecError> {
        let raw = parse_raw(text)?;
        let mut resolved_raw = Vec::with_capacity(TILE_COUNT);
        let mut specs = Vec::with_capacity(TILE_COUNT);
        for (i, slot) in raw.into_iter().enumerate() {
            let tile = i as u16;
            let r = slot.ok_or(TileSpecError::Undefined { tile })?;
            specs.push(build_spec(tile, &r)?);
            resolved_raw.push(r);
        }
        resolve_buildings(&mut specs, &resolved_raw)?;
        Ok(Self { specs })
    }

    pub fn load_default() -> Result<Self, TileSpecError> {
        Self::parse(DEFAULT_TILES_RC)
    }

    /// Spec for the tile stored in `cell`; flag bits are ignored.
    #[inline]
    pub fn get(&self, cell: u16) -> &TileSpec {
        let idx = (cell & LOMASK) as usize;
        &self.specs[idx.min(self.specs.len() - 1)]
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn is_combustible(&self, cell: u16) -> bool {
        self.get(cell).burnable
    }

    pub fn is_conductive(&self, cell: u16) -> bool {
        self.get(cell).conducts
    }

    pub fn is_bulldozable(&self, cell: u16) -> bool {
        self.get(cell).bulldozable
    }

    pub fn is_overwater(&self, cell: u16) -> bool {
        self.get(cell).overwater
    }

    pub fn is_zone_center(&self, cell: u16) -> bool {
        self.get(cell).zone
    }

    pub fn is_animated(&self, cell: u16) -> bool {
        self.get(cell).animated
    }

    pub fn building(&self, cell: u16) -> Option<&BuildingInfo> {
        self.get(cell).building.as_ref()
    }

    /// Zone-center tile owning `cell`, following power-state variants back to
    /// the member they replace.
    pub fn owner_of(&self, cell: u16) -> Option<u16> {
        let spec = self.get(cell);
        spec.owner
            .or_else(|| spec.on_shutdown.and_then(|t| self.get(t).owner))
    }

    /// Status bits written alongside the tile number in a city file.
    pub fn export_flags(&self, cell: u16) -> u16 {
        let spec = self.get(cell);
        let mut bits = 0;
        if spec.conducts {
            bits |= CONDBIT;
        }
        if spec.burnable {
            bits |= BURNBIT;
        }
        if spec.bulldozable {
            bits |= BULLBIT;
        }
        if spec.animated {
            bits |= ANIMBIT;
        }
        if spec.zone {
            bits |= ZONEBIT;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::*;

    fn registry() -> TileRegistry {
        TileRegistry::load_default().expect("built-in table must load")
    }

    #[test]
    fn test_default_table_covers_every_tile() {
        let reg = registry();
        assert_eq!(reg.len(), TILE_COUNT);
    }

    #[test]
    fn test_inherited_attributes() {
        let reg = registry();
        assert!(reg.is_combustible(ROADS));
        assert!(reg.is_bulldozable(ROADS));
        assert!(!reg.is_combustible(HBRIDGE));
        assert!(reg.is_overwater(HBRIDGE));
        assert!(reg.is_conductive(HROADPOWER));
        assert_eq!(reg.get(ROADS).behavior, Some(Behavior::Road));
        assert_eq!(reg.get(LHRAIL).behavior, Some(Behavior::Rail));
        assert_eq!(reg.get(FIRE).behavior, Some(Behavior::Fire));
    }

    #[test]
    fn test_own_attribute_overrides_supertype() {
        let reg = registry();
        assert_eq!(reg.get(ROADS).pollution, 0);
        assert_eq!(reg.get(ROADS + 16).pollution, 50);
        assert_eq!(reg.get(ROADS + 80).pollution, 75);
    }

    #[test]
    fn test_building_members_point_at_center() {
        let reg = registry();
        let info = reg.building(POWERPLANT).expect("coal plant footprint");
        assert_eq!((info.width, info.height), (4, 4));
        assert_eq!(info.members.first(), Some(&COALBASE));
        for (dx, dy, t) in info.cells() {
            if t == POWERPLANT {
                assert_eq!((dx, dy), (0, 0));
                continue;
            }
            let spec = reg.get(t);
            assert_eq!(spec.owner, Some(POWERPLANT));
            assert_eq!(spec.owner_offset, (dx, dy));
        }
    }

    #[test]
    fn test_exactly_one_center_per_building() {
        let reg = registry();
        for t in 0..TILE_COUNT as u16 {
            if let Some(info) = reg.building(t) {
                let centers = info.members.iter().filter(|&&m| reg.is_zone_center(m)).count();
                assert_eq!(centers, 1, "building at {t}");
            }
        }
    }

    #[test]
    fn test_power_variants_resolve_to_owner() {
        let reg = registry();
        assert_eq!(reg.get(RADAR).on_power, Some(RADAR0));
        assert_eq!(reg.owner_of(RADAR0 + 3), Some(AIRPORT));
        assert_eq!(reg.owner_of(COALSMOKE1 + 1), Some(POWERPLANT));
    }

    #[test]
    fn test_animation_chain_cycles() {
        let reg = registry();
        let mut t = FIRE;
        for _ in 0..8 {
            t = reg.get(t).next.expect("fire animates");
        }
        assert_eq!(t, FIRE);
        assert!(reg.get(LASTTINYEXP).next.is_none());
        assert_eq!(reg.get(LASTTINYEXP).behavior, Some(Behavior::Explosion));
    }

    #[test]
    fn test_export_flags() {
        let reg = registry();
        let flags = reg.export_flags(POWERPLANT);
        assert_ne!(flags & ZONEBIT, 0);
        assert_ne!(flags & CONDBIT, 0);
        assert_eq!(reg.export_flags(DIRT), 0);
    }

    // -------------------------------------------------------------------------
    // Malformed input
    // -------------------------------------------------------------------------

    fn full_table_with(extra: &str) -> String {
        format!("0-{} filler\n{extra}", TILE_COUNT - 2)
    }

    #[test]
    fn test_minimal_table_parses() {
        let text = format!("[base] (burnable)\n0-{} filler|(inherit=base),(pollution=3)", TILE_COUNT - 1);
        let reg = TileRegistry::parse(&text).unwrap();
        assert!(reg.is_combustible(5));
        assert_eq!(reg.get(5).pollution, 3);
        assert_eq!(reg.get(5).name, "filler");
    }

    #[test]
    fn test_missing_tile_is_fatal() {
        let text = format!("0-{} filler", TILE_COUNT - 2);
        assert_eq!(
            TileRegistry::parse(&text).unwrap_err(),
            TileSpecError::Undefined {
                tile: LAST_TILE
            }
        );
    }

    #[test]
    fn test_unknown_supertype_is_fatal() {
        let text = full_table_with("959 x (inherit=nope)");
        assert!(matches!(
            TileRegistry::parse(&text),
            Err(TileSpecError::UnknownSupertype { .. })
        ));
    }

    #[test]
    fn test_supertype_cannot_inherit() {
        let text = format!("[a] (burnable)\n[b] (inherit=a)\n{}", full_table_with("959 x"));
        assert!(matches!(
            TileRegistry::parse(&text),
            Err(TileSpecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unterminated_attribute_is_fatal() {
        let text = full_table_with("959 x (burnable");
        assert!(matches!(
            TileRegistry::parse(&text),
            Err(TileSpecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_dangling_relation_is_fatal() {
        let text = full_table_with("959 x (next=5000)");
        assert!(matches!(
            TileRegistry::parse(&text),
            Err(TileSpecError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_duplicate_tile_is_fatal() {
        let text = full_table_with("958-959 x");
        assert_eq!(
            TileRegistry::parse(&text).unwrap_err(),
            TileSpecError::Duplicate { tile: 958 }
        );
    }

    #[test]
    fn test_building_on_non_zone_is_fatal() {
        let text = full_table_with("959 x (building=1x1)");
        assert!(matches!(
            TileRegistry::parse(&text),
            Err(TileSpecError::Unresolvable { .. })
        ));
    }
}
