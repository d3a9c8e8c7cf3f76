//! Debounce and classification state machine for the button lines.
//!
//! The engine is purely edge-driven: it is handed one settled level sample
//! per raw edge (after the capture side has waited out the debounce window)
//! together with the current time, and answers with the events that edge
//! produced. It owns no clock and no queue, which keeps it deterministic
//! under test; the platform backends supply both.

/// Identifier of one monitored input line (the GPIO number on hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(pub i32);

impl core::fmt::Display for LineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Electrical level sampled from a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Which electrical level counts as "button held down".
///
/// The board wires the buttons through pull-downs, so the default is
/// active-high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    fn is_active(self, level: Level) -> bool {
        match self {
            Self::ActiveHigh => level == Level::High,
            Self::ActiveLow => level == Level::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
    LongPress,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    /// Settle delay after an edge before the level is trusted.
    pub debounce_ms: u64,
    /// Hold duration after which a press counts as a long press.
    pub long_press_ms: u64,
    pub polarity: Polarity,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            long_press_ms: 2_000,
            polarity: Polarity::ActiveHigh,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LineState {
    id: LineId,
    pressed: bool,
    pressed_since_ms: u64,
    long_press_fired: bool,
}

/// Per-line debounce state for a fixed set of registered lines.
#[derive(Debug, Clone)]
pub struct ButtonEngine {
    config: ButtonConfig,
    lines: Vec<LineState>,
}

impl ButtonEngine {
    pub fn new(config: ButtonConfig, line_ids: &[LineId]) -> Self {
        let lines = line_ids
            .iter()
            .map(|&id| LineState {
                id,
                pressed: false,
                pressed_since_ms: 0,
                long_press_fired: false,
            })
            .collect();
        Self { config, lines }
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Whether the line's debounced state is currently active (held down).
    pub fn is_pressed(&self, line: LineId) -> bool {
        self.lines
            .iter()
            .any(|state| state.id == line && state.pressed)
    }

    /// How long the line has been held, or `None` if it is not pressed.
    ///
    /// Callers log this alongside `Released`; it is not part of the event
    /// payload.
    pub fn press_duration_ms(&self, line: LineId, now_ms: u64) -> Option<u64> {
        self.lines
            .iter()
            .find(|state| state.id == line && state.pressed)
            .map(|state| now_ms.saturating_sub(state.pressed_since_ms))
    }

    /// Feed one settled level sample for `line` and collect the resulting
    /// events, in emission order.
    ///
    /// An unknown line id yields no events. A sample matching the stable
    /// state commits nothing (the edge was bounce, or the state had already
    /// settled). The long-press check runs on every processed edge while the
    /// line is active, so a button held perfectly still emits no `LongPress`
    /// until further edge activity arrives for that line.
    pub fn settle(&mut self, line: LineId, level: Level, now_ms: u64) -> Vec<ButtonEvent> {
        let Some(state) = self.lines.iter_mut().find(|state| state.id == line) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let pressed = self.config.polarity.is_active(level);

        if pressed != state.pressed {
            state.pressed = pressed;

            if pressed {
                state.pressed_since_ms = now_ms;
                state.long_press_fired = false;
                events.push(ButtonEvent::Pressed);
            } else {
                state.long_press_fired = false;
                events.push(ButtonEvent::Released);
            }
        }

        if state.pressed
            && !state.long_press_fired
            && now_ms.saturating_sub(state.pressed_since_ms) >= self.config.long_press_ms
        {
            state.long_press_fired = true;
            events.push(ButtonEvent::LongPress);
        }

        events
    }
}
