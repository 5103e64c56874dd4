/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub display: DisplayConfig,
    pub keys: KeyConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    pub sound: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub size: usize,
    pub start_tiles: usize,
    pub spawn_value: u32,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub tile_width: usize,   // terminal columns per tile
    pub tile_height: usize,  // terminal rows per tile
    /// Palette overrides: tile value (or "super") → "rrggbb".
    pub palette: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub filter: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    palette: BTreeMap<String, String>,
    #[serde(default)]
    keys: TomlKeys,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    sound: TomlSound,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_size")]
    size: usize,
    #[serde(default = "default_start_tiles")]
    start_tiles: usize,
    #[serde(default = "default_spawn_value")]
    spawn_value: u32,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tile_width")]
    tile_width: usize,
    #[serde(default = "default_tile_height")]
    tile_height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    #[serde(default = "default_keys_up")]
    up: Vec<String>,
    #[serde(default = "default_keys_down")]
    down: Vec<String>,
    #[serde(default = "default_keys_left")]
    left: Vec<String>,
    #[serde(default = "default_keys_right")]
    right: Vec<String>,
    #[serde(default = "default_keys_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_filter")]
    filter: String,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_sound_enabled")]
    enabled: bool,
}

// ── Defaults ──

const MIN_SIZE: usize = 2;
const MAX_SIZE: usize = 16;
const MIN_TILE_WIDTH: usize = 3;
const MAX_SPAWN_VALUE: u32 = 1 << 16;

fn default_size() -> usize { 5 }
fn default_start_tiles() -> usize { 2 }
fn default_spawn_value() -> u32 { 2 }
fn default_tile_width() -> usize { 8 }
fn default_tile_height() -> usize { 3 }   // roughly square in most terminal fonts

pub(crate) fn default_keys_up() -> Vec<String> { vec!["Up".into(), "w".into(), "k".into()] }
pub(crate) fn default_keys_down() -> Vec<String> { vec!["Down".into(), "s".into(), "j".into()] }
pub(crate) fn default_keys_left() -> Vec<String> { vec!["Left".into(), "a".into(), "h".into()] }
pub(crate) fn default_keys_right() -> Vec<String> { vec!["Right".into(), "d".into(), "l".into()] }
pub(crate) fn default_keys_quit() -> Vec<String> { vec!["Esc".into(), "q".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_filter() -> String { "info".into() }
fn default_sound_enabled() -> bool { true }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            size: default_size(),
            start_tiles: default_start_tiles(),
            spawn_value: default_spawn_value(),
            seed: None,
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            tile_width: default_tile_width(),
            tile_height: default_tile_height(),
        }
    }
}

impl Default for TomlKeys {
    fn default() -> Self {
        TomlKeys {
            up: default_keys_up(),
            down: default_keys_down(),
            left: default_keys_left(),
            right: default_keys_right(),
            quit: default_keys_quit(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { quit: default_pad_quit() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: None, filter: default_log_filter() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: default_sound_enabled() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() { continue; }
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return GameConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
        GameConfig::default()
    }

    /// Parse a config document. Out-of-range values are corrected, not rejected.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let mut size = cfg.board.size;
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            eprintln!(
                "Warning: board size {size} outside {MIN_SIZE}..={MAX_SIZE}, using {}",
                default_size()
            );
            size = default_size();
        }

        let mut spawn_value = cfg.board.spawn_value;
        if spawn_value == 0 || spawn_value > MAX_SPAWN_VALUE {
            eprintln!(
                "Warning: spawn_value {spawn_value} outside 1..={MAX_SPAWN_VALUE}, using {}",
                default_spawn_value()
            );
            spawn_value = default_spawn_value();
        }

        GameConfig {
            board: BoardConfig {
                size,
                start_tiles: cfg.board.start_tiles.min(size * size),
                spawn_value,
                seed: cfg.board.seed,
            },
            display: DisplayConfig {
                tile_width: cfg.display.tile_width.max(MIN_TILE_WIDTH),
                tile_height: cfg.display.tile_height.max(1),
                palette: cfg.palette,
            },
            keys: KeyConfig {
                up: cfg.keys.up,
                down: cfg.keys.down,
                left: cfg.keys.left,
                right: cfg.keys.right,
                quit: cfg.keys.quit,
            },
            gamepad: GamepadConfig { quit: cfg.gamepad.quit },
            log: LogConfig {
                file: cfg.log.file.filter(|f| !f.is_empty()).map(PathBuf::from),
                filter: cfg.log.filter,
            },
            sound: cfg.sound.enabled,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/slide2048)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/slide2048");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/slide2048");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.board, BoardConfig { size: 5, start_tiles: 2, spawn_value: 2, seed: None });
        assert_eq!(cfg.display.tile_width, 8);
        assert_eq!(cfg.display.tile_height, 3);
        assert_eq!(cfg.keys.quit, vec!["Esc".to_string(), "q".to_string()]);
        assert!(cfg.log.file.is_none());
        assert!(cfg.sound);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [board]
            size = 4
            seed = 7

            [keys]
            up = ["i"]

            [palette]
            "2" = "112233"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.board.size, 4);
        assert_eq!(cfg.board.seed, Some(7));
        assert_eq!(cfg.board.start_tiles, 2);
        assert_eq!(cfg.keys.up, vec!["i".to_string()]);
        assert_eq!(cfg.keys.down, default_keys_down());
        assert_eq!(cfg.display.palette.get("2").map(String::as_str), Some("112233"));
    }

    #[test]
    fn bad_values_are_corrected() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [board]
            size = 1
            spawn_value = 0
            start_tiles = 100

            [display]
            tile_width = 1
            tile_height = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.board.size, 5);
        assert_eq!(cfg.board.spawn_value, 2);
        assert_eq!(cfg.board.start_tiles, 25);
        assert_eq!(cfg.display.tile_width, MIN_TILE_WIDTH);
        assert_eq!(cfg.display.tile_height, 1);
    }

    #[test]
    fn oversized_spawn_value_falls_back() {
        let cfg = GameConfig::from_toml_str("[board]\nspawn_value = 3000000000\n").unwrap();
        assert_eq!(cfg.board.spawn_value, 2);
        let cfg = GameConfig::from_toml_str("[board]\nspawn_value = 65536\n").unwrap();
        assert_eq!(cfg.board.spawn_value, MAX_SPAWN_VALUE);
    }

    #[test]
    fn log_section_is_read() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [log]
            file = "game.log"
            filter = "slide2048=debug"

            [sound]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log.file, Some(PathBuf::from("game.log")));
        assert_eq!(cfg.log.filter, "slide2048=debug");
        assert!(!cfg.sound);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[board\nsize = ").is_err());
    }
}
