// ---------------------------------------------------------------------------
// SaveError: error types for reading and writing city files
// ---------------------------------------------------------------------------

use std::fmt;

use simulation::settings::InvalidGameLevel;

/// Errors that can occur while saving or loading a city.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The file ends before the map block does.
    Truncated { expected: usize, found: usize },
    /// The file is longer than a city file can be.
    BadLength { expected: usize, found: usize },
    /// A map word names a tile the tile table does not define.
    BadTile { x: i32, y: i32, tile: u16 },
    /// The misc block holds a game level outside 0..=2.
    BadGameLevel(u16),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Truncated { expected, found } => write!(
                f,
                "Truncated city file: expected {expected} bytes, found {found}"
            ),
            SaveError::BadLength { expected, found } => write!(
                f,
                "Bad city file length: expected {expected} bytes, found {found}"
            ),
            SaveError::BadTile { x, y, tile } => {
                write!(f, "Unknown tile {tile} at ({x}, {y})")
            }
            SaveError::BadGameLevel(level) => write!(f, "Invalid game level {level}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<InvalidGameLevel> for SaveError {
    fn from(e: InvalidGameLevel) -> Self {
        SaveError::BadGameLevel(e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_display_io() {
        let err = SaveError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
    }

    #[test]
    fn test_save_error_display_truncated() {
        let err = SaveError::Truncated {
            expected: 27120,
            found: 100,
        };
        let msg = format!("{err}");
        assert!(msg.contains("27120"), "got: {msg}");
        assert!(msg.contains("100"), "got: {msg}");
    }

    #[test]
    fn test_save_error_from_game_level() {
        let err: SaveError = InvalidGameLevel(7).into();
        assert!(matches!(err, SaveError::BadGameLevel(7)));
        assert!(format!("{err}").contains('7'));
    }

    #[test]
    fn test_save_error_source() {
        let err = SaveError::Io(std::io::Error::new(std::io::ErrorKind::Other, "test"));
        assert!(std::error::Error::source(&err).is_some());
        let err = SaveError::BadTile { x: 1, y: 2, tile: 999 };
        assert!(std::error::Error::source(&err).is_none());
    }
}
