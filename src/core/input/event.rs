//=========================================================================
// Raw Event Types
//
// Platform-level input events as reported by the kernel, before any
// translation into game events.
//
// Responsibilities:
// - Represent keyboard, mouse and joystick input in a portable way
// - Carry the kernel timestamp each event was observed at
// - Provide a `Quit` event for OS-level shutdown requests
//
// Event Flow:
// ```text
// Kernel plugin
//      ↓ pending_events(now)
//   RawEvent (this module)
//      ↓ EventTranslator
//   GameEvent
//      ↓ GameEventListener
// ```
//
// Enums derive serde so translators can copy them verbatim into game
// event properties.
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== ButtonState =========================================================

/// Pressed/released state shared by keys, mouse and joystick buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Pressed,
    Released,
}

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Key reported by the kernel but not mapped here.
    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt) at the time of a key or
/// button event. Left/right variants are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

//=== Joystick ============================================================

/// Game controller button identifier (Xbox-style layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoystickButton {
    Invalid,
    A, B, X, Y,
    Back, Guide, Start,
    LeftStick, RightStick,
    LeftShoulder, RightShoulder,
    DpadUp, DpadDown, DpadLeft, DpadRight,
}

/// Game controller analog axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoystickAxis {
    Invalid,
    LeftX, LeftY,
    RightX, RightY,
    TriggerLeft, TriggerRight,
}

/// What a joystick event reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoystickInput {
    Button {
        button: JoystickButton,
        state: ButtonState,
    },

    /// Axis motion; `value` is normalized to `-1.0..=1.0`.
    Axis { axis: JoystickAxis, value: f32 },
}

//=== RawEventKind ========================================================

/// Payload of a raw kernel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEventKind {
    /// Window close / OS shutdown request.
    Quit,

    Key {
        key: KeyCode,
        state: ButtonState,
        modifiers: Modifiers,
    },

    /// Mouse button with the cursor position at the time of the click.
    MouseButton {
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
    },

    /// Cursor moved; screen space, top-left origin.
    MouseMotion { x: f32, y: f32 },

    Joystick { id: u32, input: JoystickInput },

    /// Event the kernel could not classify. Translators should ignore it.
    Unidentified,
}

//=== RawEvent ============================================================

/// A platform event as reported by the kernel, stamped with the kernel
/// clock (milliseconds since the kernel timer started).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEvent {
    pub timestamp: u32,
    pub kind: RawEventKind,
}

impl RawEvent {
    pub fn new(timestamp: u32, kind: RawEventKind) -> Self {
        Self { timestamp, kind }
    }

    pub fn quit(timestamp: u32) -> Self {
        Self::new(timestamp, RawEventKind::Quit)
    }

    pub fn key_down(timestamp: u32, key: KeyCode) -> Self {
        Self::new(
            timestamp,
            RawEventKind::Key {
                key,
                state: ButtonState::Pressed,
                modifiers: Modifiers::NONE,
            },
        )
    }

    pub fn key_up(timestamp: u32, key: KeyCode) -> Self {
        Self::new(
            timestamp,
            RawEventKind::Key {
                key,
                state: ButtonState::Released,
                modifiers: Modifiers::NONE,
            },
        )
    }

    /// Returns a copy with the given modifiers. Has no effect on events
    /// without modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        if let RawEventKind::Key { modifiers: m, .. } = &mut self.kind {
            *m = modifiers;
        }
        self
    }

    pub fn is_quit(&self) -> bool {
        matches!(self.kind, RawEventKind::Quit)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
