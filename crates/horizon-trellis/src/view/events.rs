//! Input events routed through the view tree.
//!
//! A single [`UiEvent`] type carries mouse, touch, wheel, key and set-cursor
//! input. The routers rewrite its coordinates into each view's local space
//! on the way down and restore them on the way back, so a handler always
//! sees positions relative to its own view.
//!
//! # Propagation flags
//!
//! - [`stop_propagation`](UiEvent::stop_propagation): ancestors skip their
//!   default handling for this event.
//! - [`prevent_default`](UiEvent::prevent_default): the remaining default
//!   steps at the current view are skipped.
//! - [`pass_to_next`](UiEvent::pass_to_next): the view declines the event,
//!   so the router offers it to the next hit-test candidate.
//!
//! ```
//! use horizon_trellis::{UiAction, UiEvent};
//!
//! let mut event = UiEvent::mouse(UiAction::LeftButtonDown, 10.0, 20.0);
//! event.stop_propagation();
//! assert!(event.is_stopped_propagation());
//! event.reset_status();
//! assert!(!event.is_stopped_propagation());
//! ```

use cursor_icon::CursorIcon;
use horizon_trellis_render::Point;

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    pub shift: bool,
    /// Control (Cmd on macOS).
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardModifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UiAction {
    #[default]
    Unknown,

    LeftButtonDown,
    LeftButtonUp,
    LeftButtonDrag,
    LeftButtonDoubleClick,
    RightButtonDown,
    RightButtonUp,
    RightButtonDrag,
    RightButtonDoubleClick,
    MiddleButtonDown,
    MiddleButtonUp,
    MiddleButtonDrag,
    MiddleButtonDoubleClick,
    MouseMove,
    MouseEnter,
    MouseLeave,
    MouseWheel,

    TouchBegin,
    TouchMove,
    TouchEnd,
    TouchCancel,

    KeyDown,
    KeyUp,

    SetCursor,
}

impl UiAction {
    pub fn is_button_down(self) -> bool {
        matches!(
            self,
            Self::LeftButtonDown | Self::RightButtonDown | Self::MiddleButtonDown
        )
    }

    pub fn is_touch(self) -> bool {
        matches!(
            self,
            Self::TouchBegin | Self::TouchMove | Self::TouchEnd | Self::TouchCancel
        )
    }

    /// The action that releases a capture started by `self`.
    ///
    /// Only the three mouse buttons and touch begin have a pair; other
    /// actions never start a capture.
    pub fn action_up_for(self) -> Option<UiAction> {
        match self {
            Self::LeftButtonDown => Some(Self::LeftButtonUp),
            Self::RightButtonDown => Some(Self::RightButtonUp),
            Self::MiddleButtonDown => Some(Self::MiddleButtonUp),
            Self::TouchBegin => Some(Self::TouchEnd),
            _ => None,
        }
    }
}

/// Lifecycle of a single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchPhase {
    #[default]
    Move,
    Begin,
    End,
    Cancel,
}

/// One finger of a touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub point: Point,
    pub pressure: f32,
    pub phase: TouchPhase,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            point: Point::new(x, y),
            pressure: 0.0,
            phase: TouchPhase::Move,
        }
    }

    pub fn with_phase(mut self, phase: TouchPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }
}

/// Keys the engine itself reacts to, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Keycode {
    #[default]
    Unknown,
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// A printable character key.
    Char(char),
    /// A platform key code with no dedicated variant.
    Other(u32),
}

/// An input event travelling through the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEvent {
    action: UiAction,
    /// The primary pointer; for touch events this is the first touch point.
    touch_point: TouchPoint,
    touch_points: Vec<TouchPoint>,
    delta_x: f32,
    delta_y: f32,
    keycode: Keycode,
    modifiers: KeyboardModifiers,
    cursor: Option<CursorIcon>,

    stopped_propagation: bool,
    prevented_default: bool,
    passed_to_next: bool,
}

impl UiEvent {
    fn with_action(action: UiAction) -> Self {
        Self {
            action,
            touch_point: TouchPoint::new(0.0, 0.0),
            touch_points: Vec::new(),
            delta_x: 0.0,
            delta_y: 0.0,
            keycode: Keycode::Unknown,
            modifiers: KeyboardModifiers::NONE,
            cursor: None,
            stopped_propagation: false,
            prevented_default: false,
            passed_to_next: false,
        }
    }

    /// A mouse event at (`x`, `y`) in the receiving view's coordinates.
    pub fn mouse(action: UiAction, x: f32, y: f32) -> Self {
        let mut event = Self::with_action(action);
        event.touch_point = TouchPoint::new(x, y);
        event
    }

    /// A wheel event; positive deltas scroll towards the origin.
    pub fn mouse_wheel(x: f32, y: f32, delta_x: f32, delta_y: f32) -> Self {
        let mut event = Self::mouse(UiAction::MouseWheel, x, y);
        event.delta_x = delta_x;
        event.delta_y = delta_y;
        event
    }

    /// A set-cursor query at (`x`, `y`).
    pub fn set_cursor_event(x: f32, y: f32) -> Self {
        Self::mouse(UiAction::SetCursor, x, y)
    }

    /// A touch event. The first point becomes the primary point.
    pub fn touch(action: UiAction, points: Vec<TouchPoint>) -> Self {
        let mut event = Self::with_action(action);
        if let Some(first) = points.first() {
            event.touch_point = *first;
        }
        event.touch_points = points;
        event
    }

    /// A single-finger touch event.
    pub fn touch_at(action: UiAction, x: f32, y: f32) -> Self {
        let phase = match action {
            UiAction::TouchBegin => TouchPhase::Begin,
            UiAction::TouchEnd => TouchPhase::End,
            UiAction::TouchCancel => TouchPhase::Cancel,
            _ => TouchPhase::Move,
        };
        Self::touch(action, vec![TouchPoint::new(x, y).with_phase(phase)])
    }

    pub fn key(action: UiAction, keycode: Keycode, modifiers: KeyboardModifiers) -> Self {
        let mut event = Self::with_action(action);
        event.keycode = keycode;
        event.modifiers = modifiers;
        event
    }

    pub fn action(&self) -> UiAction {
        self.action
    }

    pub fn set_action(&mut self, action: UiAction) {
        self.action = action;
    }

    pub fn point(&self) -> Point {
        self.touch_point.point
    }

    pub fn set_point(&mut self, point: Point) {
        self.touch_point.point = point;
    }

    pub fn x(&self) -> f32 {
        self.touch_point.point.x
    }

    pub fn y(&self) -> f32 {
        self.touch_point.point.y
    }

    pub fn touch_point(&self) -> TouchPoint {
        self.touch_point
    }

    pub fn set_touch_point(&mut self, point: TouchPoint) {
        self.touch_point = point;
    }

    pub fn touch_points(&self) -> &[TouchPoint] {
        &self.touch_points
    }

    pub fn set_touch_points(&mut self, points: Vec<TouchPoint>) {
        self.touch_points = points;
    }

    pub(crate) fn take_touch_points(&mut self) -> Vec<TouchPoint> {
        std::mem::take(&mut self.touch_points)
    }

    pub fn delta_x(&self) -> f32 {
        self.delta_x
    }

    pub fn delta_y(&self) -> f32 {
        self.delta_y
    }

    pub fn keycode(&self) -> Keycode {
        self.keycode
    }

    pub fn modifiers(&self) -> KeyboardModifiers {
        self.modifiers
    }

    pub fn is_shift_key(&self) -> bool {
        self.modifiers.shift
    }

    /// The cursor chosen by the view that answered a set-cursor event.
    pub fn cursor(&self) -> Option<CursorIcon> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<CursorIcon>) {
        self.cursor = cursor;
    }

    pub fn stop_propagation(&mut self) {
        self.stopped_propagation = true;
    }

    pub fn is_stopped_propagation(&self) -> bool {
        self.stopped_propagation
    }

    pub fn set_stopped_propagation(&mut self, stopped: bool) {
        self.stopped_propagation = stopped;
    }

    pub fn prevent_default(&mut self) {
        self.prevented_default = true;
    }

    pub fn is_prevented_default(&self) -> bool {
        self.prevented_default
    }

    pub fn set_prevented_default(&mut self, prevented: bool) {
        self.prevented_default = prevented;
    }

    /// Decline the event so the router tries the next candidate view.
    pub fn pass_to_next(&mut self) {
        self.passed_to_next = true;
    }

    pub fn is_passed_to_next(&self) -> bool {
        self.passed_to_next
    }

    /// Clear all three propagation flags.
    pub fn reset_status(&mut self) {
        self.stopped_propagation = false;
        self.prevented_default = false;
        self.passed_to_next = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_pairs() {
        assert_eq!(UiAction::LeftButtonDown.action_up_for(), Some(UiAction::LeftButtonUp));
        assert_eq!(UiAction::MiddleButtonDown.action_up_for(), Some(UiAction::MiddleButtonUp));
        assert_eq!(UiAction::TouchBegin.action_up_for(), Some(UiAction::TouchEnd));
        assert_eq!(UiAction::MouseMove.action_up_for(), None);
        assert_eq!(UiAction::LeftButtonDoubleClick.action_up_for(), None);
    }

    #[test]
    fn test_touch_primary_point() {
        let event = UiEvent::touch(
            UiAction::TouchMove,
            vec![TouchPoint::new(1.0, 2.0), TouchPoint::new(3.0, 4.0)],
        );
        assert_eq!(event.point(), Point::new(1.0, 2.0));
        assert_eq!(event.touch_points().len(), 2);

        let begin = UiEvent::touch_at(UiAction::TouchBegin, 5.0, 5.0);
        assert_eq!(begin.touch_point().phase, TouchPhase::Begin);
    }

    #[test]
    fn test_flags() {
        let mut event = UiEvent::key(UiAction::KeyDown, Keycode::Tab, KeyboardModifiers::SHIFT);
        assert!(event.is_shift_key());
        event.prevent_default();
        event.pass_to_next();
        assert!(event.is_prevented_default() && event.is_passed_to_next());
        event.reset_status();
        assert!(!event.is_prevented_default() && !event.is_passed_to_next());
    }

    #[test]
    fn test_wheel_deltas() {
        let event = UiEvent::mouse_wheel(0.0, 0.0, 0.0, -1.0);
        assert_eq!(event.action(), UiAction::MouseWheel);
        assert_eq!(event.delta_y(), -1.0);
        assert!(!KeyboardModifiers::NONE.any());
    }
}
