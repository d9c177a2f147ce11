//=========================================================================
// Input Vocabulary
//=========================================================================
//
// Raw event types shared between kernel implementations and event
// translators. The kernel produces them, translators consume them; the
// core never interprets them itself.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;

//=== Public API ==========================================================

pub use event::{
    ButtonState, JoystickAxis, JoystickButton, JoystickInput, KeyCode, Modifiers, MouseButton,
    RawEvent, RawEventKind,
};
