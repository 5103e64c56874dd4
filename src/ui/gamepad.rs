/// Gamepad input tracker using gilrs.
///
/// Directions come from the D-pad and the left stick, edge-triggered so
/// holding a direction gives one move. Quit buttons come from config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Move
///   Select                →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::direction::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South        => Some(Btn::A),
            Button::East         => Some(Btn::B),
            Button::West         => Some(Btn::X),
            Button::North        => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start        => Some(Btn::Start),
            Button::Select       => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-input state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    /// Update `held`, raising `just_pressed` on the rising edge.
    fn set_held(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// One BtnState per direction, indexed like `Direction::ALL`.
#[derive(Clone, Copy, Debug, Default)]
struct DirPad([BtnState; 4]);

impl DirPad {
    fn get_mut(&mut self, dir: Direction) -> &mut BtnState {
        &mut self.0[dir_index(dir)]
    }

    fn just_pressed(&self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.0[dir_index(d)].just_pressed)
    }

    fn clear_edges(&mut self) {
        for s in &mut self.0 { s.just_pressed = false; }
    }
}

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

/// Parse configured button names, falling back to `default` when none parse.
fn parse_buttons(names: &[String], default: Btn) -> Vec<Btn> {
    let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
    if btns.is_empty() { vec![default] } else { btns }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: DirPad,
    stick: DirPad,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    quit_buttons: Vec<Btn>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::debug!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        let quit_buttons = parse_buttons(&cfg.quit, Btn::Select);

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: DirPad::default(),
            stick: DirPad::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            quit_buttons,
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states (gilrs: +Y is up)
        let (sx, sy) = (self.stick_x, self.stick_y);
        self.stick.get_mut(Direction::Left).set_held(sx < -STICK_DEADZONE);
        self.stick.get_mut(Direction::Right).set_held(sx > STICK_DEADZONE);
        self.stick.get_mut(Direction::Up).set_held(sy > STICK_DEADZONE);
        self.stick.get_mut(Direction::Down).set_held(sy < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(Direction::Up),
            Button::DPadDown  => Some(Direction::Down),
            Button::DPadLeft  => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            self.dpad.get_mut(dir).set_held(held);
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set_held(held);
        }
    }

    // ── Action queries ──

    /// Direction freshly pressed this frame (D-pad wins over stick).
    pub fn direction_pressed(&self) -> Option<Direction> {
        self.dpad.just_pressed().or_else(|| self.stick.just_pressed())
    }

    pub fn quit_pressed(&self) -> bool {
        self.quit_buttons.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    /// Any button or direction freshly pressed this frame.
    pub fn any_pressed(&self) -> bool {
        self.buttons.iter().any(|b| b.just_pressed) || self.direction_pressed().is_some()
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad.clear_edges();
        self.stick.clear_edges();
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = DirPad::default();
        self.stick = DirPad::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
