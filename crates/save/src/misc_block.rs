//! The 120-word block of scalar city state.
//!
//! Word layout (32-bit values high word first):
//!
//! | index  | contents                                              |
//! |--------|-------------------------------------------------------|
//! | 0-1    | reserved                                              |
//! | 2-4    | residential, commercial, industrial population        |
//! | 5-7    | residential, commercial, industrial valve             |
//! | 8-9    | city time                                             |
//! | 10-11  | crime ramp, pollution ramp                            |
//! | 12-15  | land value, crime, pollution averages; game level     |
//! | 16-17  | city class, city score                                |
//! | 18-49  | reserved                                              |
//! | 50-51  | funds                                                 |
//! | 52-57  | auto-bulldoze, auto-budget, auto-go, sound, tax, speed|
//! | 58-63  | police, fire, road funding (x65536)                   |
//! | 64-119 | reserved                                              |

use simulation::evaluation::CityClass;
use simulation::settings::GameLevel;
use simulation::speed::SimSpeed;

use crate::save_error::SaveError;

pub const MISC_WORDS: usize = 120;

const FIXED_ONE: f64 = 65536.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MiscBlock {
    pub res_pop: i16,
    pub com_pop: i16,
    pub ind_pop: i16,
    pub res_valve: i16,
    pub com_valve: i16,
    pub ind_valve: i16,
    pub city_time: i32,
    pub crime_ramp: i16,
    pub pollution_ramp: i16,
    pub land_value_average: i16,
    pub crime_average: i16,
    pub pollution_average: i16,
    pub game_level: GameLevel,
    pub city_class: CityClass,
    pub city_score: i16,
    pub funds: i32,
    pub auto_bulldoze: bool,
    pub auto_budget: bool,
    pub auto_go: bool,
    pub sound_on: bool,
    pub tax_rate: i16,
    pub speed: SimSpeed,
    /// Funding fractions in 0.0..=1.0.
    pub police_percent: f64,
    pub fire_percent: f64,
    pub road_percent: f64,
}

impl Default for MiscBlock {
    fn default() -> Self {
        Self {
            res_pop: 0,
            com_pop: 0,
            ind_pop: 0,
            res_valve: 0,
            com_valve: 0,
            ind_valve: 0,
            city_time: 0,
            crime_ramp: 0,
            pollution_ramp: 0,
            land_value_average: 0,
            crime_average: 0,
            pollution_average: 0,
            game_level: GameLevel::Easy,
            city_class: CityClass::Village,
            city_score: 500,
            funds: 0,
            auto_bulldoze: true,
            auto_budget: true,
            auto_go: false,
            sound_on: true,
            tax_rate: 7,
            speed: SimSpeed::Normal,
            police_percent: 1.0,
            fire_percent: 1.0,
            road_percent: 1.0,
        }
    }
}

/// Saturate into a 16-bit word.
pub fn clamp16(v: i64) -> i16 {
    v.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

fn put32(words: &mut [u16; MISC_WORDS], at: usize, value: i32) {
    let bits = value as u32;
    words[at] = (bits >> 16) as u16;
    words[at + 1] = bits as u16;
}

fn get32(words: &[u16; MISC_WORDS], at: usize) -> i32 {
    (((words[at] as u32) << 16) | words[at + 1] as u32) as i32
}

fn to_fixed(percent: f64) -> i32 {
    (percent.clamp(0.0, 1.0) * FIXED_ONE).round() as i32
}

fn from_fixed(raw: i32) -> f64 {
    (raw as f64 / FIXED_ONE).clamp(0.0, 1.0)
}

impl MiscBlock {
    pub fn to_words(&self) -> [u16; MISC_WORDS] {
        let mut w = [0u16; MISC_WORDS];
        w[2] = self.res_pop as u16;
        w[3] = self.com_pop as u16;
        w[4] = self.ind_pop as u16;
        w[5] = self.res_valve as u16;
        w[6] = self.com_valve as u16;
        w[7] = self.ind_valve as u16;
        put32(&mut w, 8, self.city_time);
        w[10] = self.crime_ramp as u16;
        w[11] = self.pollution_ramp as u16;
        w[12] = self.land_value_average as u16;
        w[13] = self.crime_average as u16;
        w[14] = self.pollution_average as u16;
        w[15] = u16::from(self.game_level);
        w[16] = self.city_class.index();
        w[17] = self.city_score as u16;
        put32(&mut w, 50, self.funds);
        w[52] = u16::from(self.auto_bulldoze);
        w[53] = u16::from(self.auto_budget);
        w[54] = u16::from(self.auto_go);
        w[55] = u16::from(self.sound_on);
        w[56] = self.tax_rate as u16;
        w[57] = self.speed.index();
        put32(&mut w, 58, to_fixed(self.police_percent));
        put32(&mut w, 60, to_fixed(self.fire_percent));
        put32(&mut w, 62, to_fixed(self.road_percent));
        w
    }

    /// Read the block back. Reserved words are ignored.
    pub fn from_words(w: &[u16; MISC_WORDS]) -> Result<Self, SaveError> {
        Ok(Self {
            res_pop: w[2] as i16,
            com_pop: w[3] as i16,
            ind_pop: w[4] as i16,
            res_valve: w[5] as i16,
            com_valve: w[6] as i16,
            ind_valve: w[7] as i16,
            city_time: get32(w, 8).max(0),
            crime_ramp: w[10] as i16,
            pollution_ramp: w[11] as i16,
            land_value_average: w[12] as i16,
            crime_average: w[13] as i16,
            pollution_average: w[14] as i16,
            game_level: GameLevel::try_from(w[15])?,
            city_class: CityClass::from_index(w[16]),
            city_score: w[17] as i16,
            funds: get32(w, 50),
            auto_bulldoze: w[52] != 0,
            auto_budget: w[53] != 0,
            auto_go: w[54] != 0,
            sound_on: w[55] != 0,
            tax_rate: (w[56] as i16).clamp(0, 20),
            speed: SimSpeed::from_index(w[57]),
            police_percent: from_fixed(get32(w, 58)),
            fire_percent: from_fixed(get32(w, 60)),
            road_percent: from_fixed(get32(w, 62)),
        })
    }
}
