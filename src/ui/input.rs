/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Key-down / key-up intents per player for the simulation
///   - Edge-triggered menu keys (only fire on initial press)
///   - Both players holding keys at the same time
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};
use tracing::warn;

use crate::config::ControlsConfig;
use crate::domain::entity::{InputAction, InputEvent, PlayerColor};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&normalize(key.code));
                    }
                    KeyEventKind::Release => {}
                    _ => {
                        let code = normalize(key.code);
                        let was_held = self.is_held(code);
                        self.last_active.insert(code, Instant::now());
                        if !was_held {
                            self.fresh_presses.push(code);
                        }
                    }
                }
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Any fresh press at all ("press any key").
    pub fn anything_pressed(&self) -> bool {
        !self.fresh_presses.is_empty()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Letters are tracked case-insensitively so Shift does not drop a hold.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Key name from config → key code. Single characters map to themselves.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        s if s.chars().count() == 1 => KeyCode::Char(s.chars().next()?),
        _ => return None,
    };
    Some(code)
}

// ══════════════════════════════════════════════════════════════
// Player bindings → simulation intents
// ══════════════════════════════════════════════════════════════

const PLAYERS: [PlayerColor; 2] = [PlayerColor::Blue, PlayerColor::Red];
const ACTIONS: [InputAction; 3] = [InputAction::Left, InputAction::Right, InputAction::Jump];

pub struct KeyMap {
    bindings: Vec<(KeyCode, PlayerColor, InputAction)>,
}

impl KeyMap {
    pub fn from_config(controls: &ControlsConfig) -> Self {
        let mut bindings = Vec::new();
        for color in PLAYERS {
            let keys = controls.for_player(color);
            for (action, names) in [
                (InputAction::Left, &keys.left),
                (InputAction::Right, &keys.right),
                (InputAction::Jump, &keys.jump),
            ] {
                for name in names {
                    match parse_key(name) {
                        Some(code) => bindings.push((code, color, action)),
                        None => warn!(key = %name, player = color.name(), "unknown key name in controls"),
                    }
                }
            }
        }
        KeyMap { bindings }
    }

    /// Player actions whose bound keys are currently held.
    pub fn held_actions(&self, input: &InputState) -> HashSet<(PlayerColor, InputAction)> {
        self.bindings
            .iter()
            .filter(|(code, _, _)| input.is_held(*code))
            .map(|&(_, color, action)| (color, action))
            .collect()
    }

    pub fn is_bound(&self, code: KeyCode) -> bool {
        self.bindings.iter().any(|(c, _, _)| *c == code)
    }
}

/// Turns "held this frame" sets into key-down / key-up edges.
#[derive(Default)]
pub struct IntentTracker {
    held: HashSet<(PlayerColor, InputAction)>,
}

impl IntentTracker {
    pub fn update(&mut self, now: HashSet<(PlayerColor, InputAction)>) -> Vec<InputEvent> {
        let mut out = Vec::new();
        for color in PLAYERS {
            for action in ACTIONS {
                let key = (color, action);
                match (self.held.contains(&key), now.contains(&key)) {
                    (false, true) => out.push(InputEvent::down(color, action)),
                    (true, false) => out.push(InputEvent::up(color, action)),
                    _ => {}
                }
            }
        }
        self.held = now;
        out
    }

    /// Forget held keys, e.g. when a new level starts.
    pub fn reset(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyBindings;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(parse_key("Left"), Some(KeyCode::Left));
        assert_eq!(parse_key("w"), Some(KeyCode::Char('w')));
        assert_eq!(parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("F13-ish"), None);
    }

    #[test]
    fn keymap_binds_both_players() {
        let controls = ControlsConfig {
            blue: KeyBindings { left: names(&["a"]), right: names(&["d"]), jump: names(&["w"]) },
            red: KeyBindings { left: names(&["Left"]), right: names(&["Right"]), jump: names(&["Up", "??"]) },
        };
        let map = KeyMap::from_config(&controls);
        assert!(map.is_bound(KeyCode::Char('a')));
        assert!(map.is_bound(KeyCode::Up));
        assert!(!map.is_bound(KeyCode::Char('q')));
        assert!(map.held_actions(&InputState::new()).is_empty());
    }

    #[test]
    fn tracker_emits_edges_only() {
        let mut t = IntentTracker::default();
        let now: HashSet<_> = [(PlayerColor::Red, InputAction::Left)].into_iter().collect();
        assert_eq!(t.update(now.clone()), vec![InputEvent::down(PlayerColor::Red, InputAction::Left)]);
        assert!(t.update(now).is_empty());
        assert_eq!(t.update(HashSet::new()), vec![InputEvent::up(PlayerColor::Red, InputAction::Left)]);
    }
}
