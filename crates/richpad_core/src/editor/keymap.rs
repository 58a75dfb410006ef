//! Accelerator-key shortcuts.

/// A key press as seen by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    /// Platform accelerator (Ctrl, or Cmd on macOS) held down.
    pub accelerator: bool,
    pub key: char,
}

impl KeyChord {
    pub fn accel(key: char) -> Self {
        Self {
            accelerator: true,
            key,
        }
    }

    pub fn plain(key: char) -> Self {
        Self {
            accelerator: false,
            key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Save,
    Bold,
    Italic,
    Underline,
    Undo,
    Redo,
}

/// Maps a chord to the shortcut it triggers; `None` means the key is not
/// intercepted.
pub fn shortcut_for(chord: KeyChord) -> Option<Shortcut> {
    if !chord.accelerator {
        return None;
    }
    match chord.key {
        's' => Some(Shortcut::Save),
        'b' => Some(Shortcut::Bold),
        'i' => Some(Shortcut::Italic),
        'u' => Some(Shortcut::Underline),
        'z' => Some(Shortcut::Undo),
        'y' => Some(Shortcut::Redo),
        _ => None,
    }
}
