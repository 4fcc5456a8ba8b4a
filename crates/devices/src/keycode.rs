//! Portable key codes.
//!
//! Backends translate their native scan codes into [`Keycode`]; the keyboard
//! keeps one history per variant, addressed by [`Keycode::index`].

use serde::{Deserialize, Serialize};

macro_rules! keycodes {
    ($($variant:ident => $name:literal,)+) => {
        /// A key present on every supported platform.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum Keycode {
            $($variant,)+
        }

        impl Keycode {
            /// Every key, in index order.
            pub const ALL: &'static [Keycode] = &[$(Keycode::$variant,)+];

            /// Lower-case name used in logs and events.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Keycode::$variant => $name,)+
                }
            }
        }
    };
}

keycodes! {
    A => "a", B => "b", C => "c", D => "d", E => "e", F => "f", G => "g",
    H => "h", I => "i", J => "j", K => "k", L => "l", M => "m", N => "n",
    O => "o", P => "p", Q => "q", R => "r", S => "s", T => "t", U => "u",
    V => "v", W => "w", X => "x", Y => "y", Z => "z",

    One => "1", Two => "2", Three => "3", Four => "4", Five => "5",
    Six => "6", Seven => "7", Eight => "8", Nine => "9", Zero => "0",

    Escape => "escape", Backspace => "backspace", Tab => "tab", Enter => "enter",
    Shift => "shift", Ctrl => "ctrl", Alt => "alt", Space => "space",

    Up => "up", Down => "down", Left => "left", Right => "right",
    Home => "home", End => "end", Insert => "insert", Delete => "delete",

    F1 => "f1", F2 => "f2", F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
    F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10", F11 => "f11", F12 => "f12",

    Numpad0 => "numpad0", Numpad1 => "numpad1", Numpad2 => "numpad2",
    Numpad3 => "numpad3", Numpad4 => "numpad4", Numpad5 => "numpad5",
    Numpad6 => "numpad6", Numpad7 => "numpad7", Numpad8 => "numpad8",
    Numpad9 => "numpad9",

    Add => "add", Subtract => "subtract", Multiply => "multiply",
    Divide => "divide", Separator => "separator", Decimal => "decimal",
}

impl Keycode {
    /// Number of distinct keys.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look a key up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for Keycode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
