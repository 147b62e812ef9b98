//! City-wide settings and clocks.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ANIMATION_CYCLE;

/// Difficulty, stored as 0..=2 in the city file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameLevel {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl GameLevel {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A game level outside 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidGameLevel(pub u16);

impl fmt::Display for InvalidGameLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid game level {}", self.0)
    }
}

impl std::error::Error for InvalidGameLevel {}

impl TryFrom<u16> for GameLevel {
    type Error = InvalidGameLevel;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameLevel::Easy),
            1 => Ok(GameLevel::Medium),
            2 => Ok(GameLevel::Hard),
            other => Err(InvalidGameLevel(other)),
        }
    }
}

impl From<GameLevel> for u16 {
    fn from(level: GameLevel) -> Self {
        level as u16
    }
}

/// Player-facing toggles persisted in the city file.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySettings {
    pub game_level: GameLevel,
    pub disasters_enabled: bool,
    pub auto_bulldoze: bool,
    pub auto_budget: bool,
    pub auto_go: bool,
    pub sound_on: bool,
}

impl Default for CitySettings {
    fn default() -> Self {
        Self {
            game_level: GameLevel::Easy,
            disasters_enabled: true,
            auto_bulldoze: true,
            auto_budget: true,
            auto_go: false,
            sound_on: true,
        }
    }
}

/// Counters that sequence the simulation cycle.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityClock {
    /// Simulated time; one unit per full 16-phase cycle.
    pub city_time: u32,
    /// Next phase to run, 0..16.
    pub phase_cycle: u32,
    /// Completed phase-0 passes, wrapping at 1024.
    pub sim_cycle: u32,
    /// Animation counter, wrapping at [`ANIMATION_CYCLE`].
    pub acycle: u32,
    /// Remaining steps during which flood tiles keep spreading.
    pub flood_count: i32,
    /// Set when the power scan must run on the next opportunity.
    pub new_power: bool,
}

impl CityClock {
    /// Advance the animation counter; returns `true` when a sim phase is due.
    pub fn advance_animation(&mut self) -> bool {
        self.acycle = (self.acycle + 1) % ANIMATION_CYCLE;
        self.acycle % 2 == 0
    }

    /// Phase to run now, advancing the phase counter.
    pub fn next_phase(&mut self) -> u32 {
        let phase = self.phase_cycle;
        self.phase_cycle = (self.phase_cycle + 1) % 16;
        phase
    }

    /// Calendar year shown to the player.
    pub fn year(&self) -> u32 {
        1900 + self.city_time / 48
    }

    /// Month 0..12.
    pub fn month(&self) -> u32 {
        (self.city_time % 48) / 4
    }
}
