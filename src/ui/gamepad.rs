/// Gamepad input tracker using gilrs.
///
/// One pad drives one player (chosen in config.toml). Default mapping:
///   D-pad / Left Stick    →  Walk left / right
///   D-pad Up / A / B      →  Jump
///   Start                 →  Confirm
///   Select                →  Back to level select

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::{InputAction, PlayerColor};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

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

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 8],
    dpad_left: bool,
    dpad_right: bool,
    dpad_up: bool,
    stick_x: f32,

    jump_buttons: Vec<Btn>,
    player: PlayerColor,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[allow(unused_mut)]
        let mut pad = Self::offline(cfg);
        #[cfg(feature = "gamepad")]
        {
            pad.gilrs = Gilrs::new().ok();
        }
        pad
    }

    /// Pad state with no backend attached.
    fn offline(cfg: &GamepadConfig) -> Self {
        let mut jump_buttons: Vec<Btn> = cfg.jump.iter().filter_map(|s| Btn::from_name(s)).collect();
        if jump_buttons.is_empty() {
            jump_buttons = vec![Btn::A, Btn::B];
        }

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 8],
            dpad_left: false,
            dpad_right: false,
            dpad_up: false,
            stick_x: 0.0,
            jump_buttons,
            player: cfg.player,
        }
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }

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
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::Disconnected => self.release_all(),
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        match gilrs_btn {
            Button::DPadLeft => self.dpad_left = held,
            Button::DPadRight => self.dpad_right = held,
            Button::DPadUp => self.dpad_up = held,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    let s = &mut self.buttons[btn as usize];
                    s.held = held;
                    if held {
                        s.just_pressed = true;
                    }
                }
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); 8];
        self.dpad_left = false;
        self.dpad_right = false;
        self.dpad_up = false;
        self.stick_x = 0.0;
    }

    // ── Queries ──

    pub fn player(&self) -> PlayerColor {
        self.player
    }

    /// Player actions currently held on the pad.
    pub fn held_actions(&self) -> Vec<InputAction> {
        let mut out = Vec::new();
        if self.dpad_left || self.stick_x < -STICK_DEADZONE {
            out.push(InputAction::Left);
        }
        if self.dpad_right || self.stick_x > STICK_DEADZONE {
            out.push(InputAction::Right);
        }
        if self.dpad_up || self.jump_buttons.iter().any(|&b| self.buttons[b as usize].held) {
            out.push(InputAction::Jump);
        }
        out
    }

    pub fn confirm_pressed(&self) -> bool {
        self.buttons[Btn::Start as usize].just_pressed || self.buttons[Btn::A as usize].just_pressed
    }

    pub fn cancel_pressed(&self) -> bool {
        self.buttons[Btn::Select as usize].just_pressed
    }

    pub fn any_pressed(&self) -> bool {
        self.buttons.iter().any(|b| b.just_pressed)
    }
}
