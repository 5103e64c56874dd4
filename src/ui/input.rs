/// Keyboard input mapper.
///
/// Turns raw crossterm key events into game actions using the key names
/// from config.toml. The game is turn-based, so only fresh presses count:
/// Repeat and Release events are dropped and one press is one move.
/// Unrecognized keys are ignored. Ctrl+C always quits.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::config::{self, KeyConfig};
use crate::domain::direction::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Quit,
}

/// Key → action bindings.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, Action)>,
}

impl KeyMap {
    pub fn from_config(cfg: &KeyConfig) -> Self {
        let mut map = KeyMap { bindings: Vec::with_capacity(24) };
        map.bind_all(&cfg.up, config::default_keys_up, Action::Move(Direction::Up));
        map.bind_all(&cfg.down, config::default_keys_down, Action::Move(Direction::Down));
        map.bind_all(&cfg.left, config::default_keys_left, Action::Move(Direction::Left));
        map.bind_all(&cfg.right, config::default_keys_right, Action::Move(Direction::Right));
        map.bind_all(&cfg.quit, config::default_keys_quit, Action::Quit);
        map
    }

    /// Action for a key event, if any.
    pub fn translate(&self, key: &KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Some(Action::Quit);
        }
        self.bindings
            .iter()
            .find(|(code, _)| *code == key.code)
            .map(|&(_, action)| action)
    }

    /// Bind every parsable name to `action`. If none parse, bind `defaults`.
    fn bind_all(&mut self, names: &[String], defaults: fn() -> Vec<String>, action: Action) {
        let mut codes: Vec<KeyCode> = names
            .iter()
            .filter_map(|name| {
                let code = parse_key(name);
                if code.is_none() {
                    tracing::warn!(key = %name, "ignoring unknown key name");
                }
                code
            })
            .collect();
        if codes.is_empty() {
            tracing::warn!(?action, "no usable key for action, using defaults");
            codes = defaults().iter().filter_map(|name| parse_key(name)).collect();
        }

        for code in codes {
            match code {
                KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                    // Letters bind regardless of Shift / Caps Lock
                    self.bindings.push((KeyCode::Char(c.to_ascii_lowercase()), action));
                    self.bindings.push((KeyCode::Char(c.to_ascii_uppercase()), action));
                }
                code => self.bindings.push((code, action)),
            }
        }
    }
}

/// Parse a key name from config: arrow/special key names, F1..F12,
/// or a single character.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => {
            let n: u8 = lower.strip_prefix('f')?.parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

pub struct InputState {
    keymap: KeyMap,

    /// Actions collected during the most recent drain_events() call.
    actions: Vec<Action>,

    /// Any key press at all this frame (used for "press any key").
    any_press: bool,
}

impl InputState {
    pub fn new(keymap: KeyMap) -> Self {
        InputState {
            keymap,
            actions: Vec::with_capacity(8),
            any_press: false,
        }
    }

    /// Wait up to `timeout` for the first event, then drain everything
    /// pending without blocking.
    pub fn drain_events(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.actions.clear();
        self.any_press = false;

        let mut wait = timeout;
        while poll(wait)? {
            wait = Duration::ZERO;
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.any_press = true;
                }
                if let Some(action) = self.keymap.translate(&key) {
                    self.actions.push(action);
                }
            }
        }
        Ok(())
    }

    /// Actions of this frame, in arrival order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn quit_requested(&self) -> bool {
        self.actions.contains(&Action::Quit)
    }

    pub fn any_key_pressed(&self) -> bool {
        self.any_press
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn default_map() -> KeyMap {
        KeyMap::from_config(&GameConfig::default().keys)
    }

    #[test]
    fn parses_key_names() {
        assert_eq!(parse_key("Up"), Some(KeyCode::Up));
        assert_eq!(parse_key("ESC"), Some(KeyCode::Esc));
        assert_eq!(parse_key("w"), Some(KeyCode::Char('w')));
        assert_eq!(parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(parse_key("space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("bogus"), None);
    }

    #[test]
    fn arrows_and_letters_map_to_directions() {
        let map = default_map();
        assert_eq!(map.translate(&press(KeyCode::Up)), Some(Action::Move(Direction::Up)));
        assert_eq!(map.translate(&press(KeyCode::Char('a'))), Some(Action::Move(Direction::Left)));
        assert_eq!(map.translate(&press(KeyCode::Char('D'))), Some(Action::Move(Direction::Right)));
        assert_eq!(map.translate(&press(KeyCode::Char('j'))), Some(Action::Move(Direction::Down)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let map = default_map();
        assert_eq!(map.translate(&press(KeyCode::Char('z'))), None);
        assert_eq!(map.translate(&press(KeyCode::Tab)), None);
    }

    #[test]
    fn quit_keys_and_ctrl_c() {
        let map = default_map();
        assert_eq!(map.translate(&press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map.translate(&press(KeyCode::Char('Q'))), Some(Action::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map.translate(&ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn unparsable_bindings_fall_back_to_defaults() {
        let mut keys = GameConfig::default().keys;
        keys.up = vec!["bogus".into()];
        keys.quit = vec![];
        let map = KeyMap::from_config(&keys);
        assert_eq!(map.translate(&press(KeyCode::Up)), Some(Action::Move(Direction::Up)));
        assert_eq!(map.translate(&press(KeyCode::Char('w'))), Some(Action::Move(Direction::Up)));
        assert_eq!(map.translate(&press(KeyCode::Esc)), Some(Action::Quit));
    }

    #[test]
    fn partly_valid_bindings_keep_only_the_valid_names() {
        let mut keys = GameConfig::default().keys;
        keys.up = vec!["bogus".into(), "i".into()];
        let map = KeyMap::from_config(&keys);
        assert_eq!(map.translate(&press(KeyCode::Char('I'))), Some(Action::Move(Direction::Up)));
        assert_eq!(map.translate(&press(KeyCode::Up)), None);
    }

    #[test]
    fn repeats_and_releases_do_not_move() {
        let map = default_map();
        let mut ev = press(KeyCode::Left);
        ev.kind = KeyEventKind::Repeat;
        assert_eq!(map.translate(&ev), None);
        ev.kind = KeyEventKind::Release;
        assert_eq!(map.translate(&ev), None);
    }
}
