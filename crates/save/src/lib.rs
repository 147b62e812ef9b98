//! Reading and writing city files.
//!
//! A city file is the six history arrays, a 120-word block of scalar city
//! state and the tile map, all as little-endian 16-bit words.

mod atomic_write;
mod city_file;
mod misc_block;
mod save_error;
mod save_plugin;

pub use city_file::{decode_city, encode_city, load_city, save_city, CityFile, FILE_SIZE};
pub use misc_block::MiscBlock;
pub use save_error::SaveError;
pub use save_plugin::{CityFileDone, LoadCityEvent, SaveCityEvent, SavePlugin};
