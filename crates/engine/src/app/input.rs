use winit::keyboard::{KeyCode, PhysicalKey};

/// Physical keys the engine tracks. Each key owns one slot in the keyboard arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    I,
    J,
    K,
    L,
    P,
    T,
    Q,
    Escape,
}

pub const KEY_COUNT: usize = 16;

impl Key {
    pub const ALL: [Key; KEY_COUNT] = [
        Key::ArrowUp,
        Key::ArrowDown,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::I,
        Key::J,
        Key::K,
        Key::L,
        Key::P,
        Key::T,
        Key::Q,
        Key::Escape,
    ];

    const fn index(self) -> usize {
        match self {
            Key::ArrowUp => 0,
            Key::ArrowDown => 1,
            Key::ArrowLeft => 2,
            Key::ArrowRight => 3,
            Key::W => 4,
            Key::A => 5,
            Key::S => 6,
            Key::D => 7,
            Key::I => 8,
            Key::J => 9,
            Key::K => 10,
            Key::L => 11,
            Key::P => 12,
            Key::T => 13,
            Key::Q => 14,
            Key::Escape => 15,
        }
    }

    pub fn from_physical(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        let key = match code {
            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyI => Key::I,
            KeyCode::KeyJ => Key::J,
            KeyCode::KeyK => Key::K,
            KeyCode::KeyL => Key::L,
            KeyCode::KeyP => Key::P,
            KeyCode::KeyT => Key::T,
            KeyCode::KeyQ => Key::Q,
            KeyCode::Escape => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}

/// Engine-facing platform events. Window-system events are translated into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
}

/// Dual-buffer key state.
///
/// `current` is the live snapshot the platform layer writes while events are
/// drained. `previous` holds what `current` was one frame ago. `refresh` must
/// run exactly once per frame, before that frame's events are applied; edge
/// queries compare the two buffers.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    current: [bool; KEY_COUNT],
    previous: [bool; KEY_COUNT],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self) {
        self.previous = self.current;
    }

    pub fn set_key(&mut self, key: Key, is_down: bool) {
        self.current[key.index()] = is_down;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.current[key.index()]
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.current[key.index()] && !self.previous[key.index()]
    }

    pub fn is_released(&self, key: Key) -> bool {
        !self.current[key.index()] && self.previous[key.index()]
    }

    pub fn release_all(&mut self) {
        self.current = [false; KEY_COUNT];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    CameraUp,
    CameraDown,
    CameraLeft,
    CameraRight,
    ToggleDebug,
    ToggleStressTest,
    Quit,
}

const ACTION_COUNT: usize = 11;
const MAX_KEYS_PER_ACTION: usize = 2;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::CameraUp => 4,
            InputAction::CameraDown => 5,
            InputAction::CameraLeft => 6,
            InputAction::CameraRight => 7,
            InputAction::ToggleDebug => 8,
            InputAction::ToggleStressTest => 9,
            InputAction::Quit => 10,
        }
    }
}

/// Primary and alternate key for every action.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    keys: [[Option<Key>; MAX_KEYS_PER_ACTION]; ACTION_COUNT],
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            keys: [[None; MAX_KEYS_PER_ACTION]; ACTION_COUNT],
        };
        bindings.bind(InputAction::MoveUp, Key::ArrowUp, Some(Key::W));
        bindings.bind(InputAction::MoveDown, Key::ArrowDown, Some(Key::S));
        bindings.bind(InputAction::MoveLeft, Key::ArrowLeft, Some(Key::A));
        bindings.bind(InputAction::MoveRight, Key::ArrowRight, Some(Key::D));
        bindings.bind(InputAction::CameraUp, Key::I, None);
        bindings.bind(InputAction::CameraDown, Key::K, None);
        bindings.bind(InputAction::CameraLeft, Key::J, None);
        bindings.bind(InputAction::CameraRight, Key::L, None);
        bindings.bind(InputAction::ToggleDebug, Key::P, None);
        bindings.bind(InputAction::ToggleStressTest, Key::T, None);
        bindings.bind(InputAction::Quit, Key::Escape, Some(Key::Q));
        bindings
    }
}

impl KeyBindings {
    pub fn bind(&mut self, action: InputAction, primary: Key, alternate: Option<Key>) {
        self.keys[action.index()] = [Some(primary), alternate];
    }

    pub fn keys_for(&self, action: InputAction) -> impl Iterator<Item = Key> + '_ {
        self.keys[action.index()].iter().flatten().copied()
    }

    pub fn is_bound_to(&self, key: Key, action: InputAction) -> bool {
        self.keys_for(action).any(|bound| bound == key)
    }
}

/// Action-level view over the keyboard state for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ActionInput<'a> {
    keyboard: &'a KeyboardState,
    bindings: &'a KeyBindings,
}

impl<'a> ActionInput<'a> {
    pub fn new(keyboard: &'a KeyboardState, bindings: &'a KeyBindings) -> Self {
        Self { keyboard, bindings }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.bindings
            .keys_for(action)
            .any(|key| self.keyboard.is_down(key))
    }

    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.bindings
            .keys_for(action)
            .any(|key| self.keyboard.is_pressed(key))
    }

    pub fn is_released(&self, action: InputAction) -> bool {
        self.bindings
            .keys_for(action)
            .any(|key| self.keyboard.is_released(key))
    }

    pub fn keyboard(&self) -> &KeyboardState {
        self.keyboard
    }
}
