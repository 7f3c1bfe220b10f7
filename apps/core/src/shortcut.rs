use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    #[error("shortcut key is required")]
    MissingKey,
    #[error("unsupported modifier '{0}'; use Ctrl, Meta, Alt, or Shift")]
    UnsupportedModifier(String),
}

/// A key plus modifier constraints. `None` means the modifier may be in
/// either state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: Option<bool>,
    pub meta: Option<bool>,
    pub alt: Option<bool>,
    pub shift: Option<bool>,
}

impl KeyChord {
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: None,
            meta: None,
            alt: None,
            shift: None,
        }
    }

    pub fn with_ctrl(mut self, pressed: bool) -> Self {
        self.ctrl = Some(pressed);
        self
    }

    pub fn with_meta(mut self, pressed: bool) -> Self {
        self.meta = Some(pressed);
        self
    }

    pub fn with_alt(mut self, pressed: bool) -> Self {
        self.alt = Some(pressed);
        self
    }

    pub fn with_shift(mut self, pressed: bool) -> Self {
        self.shift = Some(pressed);
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        fn flag(expected: Option<bool>, actual: bool) -> bool {
            expected.map_or(true, |expected| expected == actual)
        }

        event.key.to_lowercase() == self.key.to_lowercase()
            && flag(self.ctrl, event.ctrl)
            && flag(self.meta, event.meta)
            && flag(self.alt, event.alt)
            && flag(self.shift, event.shift)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl == Some(true) {
            parts.push("Ctrl");
        }
        if self.meta == Some(true) {
            parts.push("Meta");
        }
        if self.alt == Some(true) {
            parts.push("Alt");
        }
        if self.shift == Some(true) {
            parts.push("Shift");
        }
        parts.push(&self.key);
        f.write_str(&parts.join("+"))
    }
}

pub fn parse_chord(input: &str) -> Result<KeyChord, ChordError> {
    let parts: Vec<&str> = input
        .split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let Some((key, modifiers)) = parts.split_last() else {
        return Err(ChordError::MissingKey);
    };

    let mut chord = KeyChord::key(key);
    for modifier in modifiers {
        chord = match modifier.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => chord.with_ctrl(true),
            "meta" | "cmd" | "command" | "win" | "super" => chord.with_meta(true),
            "alt" | "option" => chord.with_alt(true),
            "shift" => chord.with_shift(true),
            _ => return Err(ChordError::UnsupportedModifier(modifier.to_string())),
        };
    }
    Ok(chord)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTarget {
    pub tag_name: Option<String>,
    pub content_editable: bool,
}

impl KeyTarget {
    pub fn document() -> Self {
        Self::default()
    }

    pub fn element(tag_name: &str) -> Self {
        Self {
            tag_name: Some(tag_name.to_string()),
            content_editable: false,
        }
    }

    pub fn editable(tag_name: &str) -> Self {
        Self {
            tag_name: Some(tag_name.to_string()),
            content_editable: true,
        }
    }

    pub fn is_text_editable(&self) -> bool {
        if self.content_editable {
            return true;
        }
        matches!(
            self.tag_name.as_deref().map(str::to_ascii_uppercase).as_deref(),
            Some("INPUT") | Some("TEXTAREA")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    pub target: KeyTarget,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn on(mut self, target: KeyTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutOptions {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub use_capture: bool,
}

impl Default for ShortcutOptions {
    fn default() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            use_capture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyResponse {
    pub handled: bool,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub trait ListenerHub {
    fn add_keydown_listener(&mut self, capture: bool) -> ListenerId;
    fn remove_keydown_listener(&mut self, id: ListenerId);
    fn add_focus_listener(&mut self) -> ListenerId;
    fn remove_focus_listener(&mut self, id: ListenerId);
}

#[derive(Debug, Default)]
pub struct MockListenerHub {
    next_id: u64,
    keydown: Vec<(ListenerId, bool)>,
    focus: Vec<ListenerId>,
}

impl MockListenerHub {
    pub fn keydown_listeners(&self) -> usize {
        self.keydown.len()
    }

    pub fn focus_listeners(&self) -> usize {
        self.focus.len()
    }

    pub fn capture_listeners(&self) -> usize {
        self.keydown.iter().filter(|(_, capture)| *capture).count()
    }

    fn allocate(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }
}

impl ListenerHub for MockListenerHub {
    fn add_keydown_listener(&mut self, capture: bool) -> ListenerId {
        let id = self.allocate();
        self.keydown.push((id, capture));
        id
    }

    fn remove_keydown_listener(&mut self, id: ListenerId) {
        self.keydown.retain(|(existing, _)| *existing != id);
    }

    fn add_focus_listener(&mut self) -> ListenerId {
        let id = self.allocate();
        self.focus.push(id);
        id
    }

    fn remove_focus_listener(&mut self, id: ListenerId) {
        self.focus.retain(|existing| *existing != id);
    }
}

impl<H: ListenerHub + ?Sized> ListenerHub for &mut H {
    fn add_keydown_listener(&mut self, capture: bool) -> ListenerId {
        (**self).add_keydown_listener(capture)
    }

    fn remove_keydown_listener(&mut self, id: ListenerId) {
        (**self).remove_keydown_listener(id)
    }

    fn add_focus_listener(&mut self) -> ListenerId {
        (**self).add_focus_listener()
    }

    fn remove_focus_listener(&mut self, id: ListenerId) {
        (**self).remove_focus_listener(id)
    }
}

pub struct ShortcutListener<H: ListenerHub> {
    hub: H,
    chords: Vec<KeyChord>,
    options: ShortcutOptions,
    callback: Box<dyn FnMut()>,
    keydown: Option<ListenerId>,
    focus: Option<ListenerId>,
}

impl<H: ListenerHub> ShortcutListener<H> {
    pub fn attach<F>(hub: H, chords: Vec<KeyChord>, options: ShortcutOptions, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let mut listener = Self {
            hub,
            chords,
            options,
            callback: Box::new(callback),
            keydown: None,
            focus: None,
        };
        listener.keydown = Some(listener.hub.add_keydown_listener(options.use_capture));
        listener.focus = Some(listener.hub.add_focus_listener());
        listener
    }

    pub fn chords(&self) -> &[KeyChord] {
        &self.chords
    }

    pub fn is_attached(&self) -> bool {
        self.keydown.is_some()
    }

    pub fn hub(&self) -> &H {
        &self.hub
    }

    pub fn handle_key_down(&mut self, event: &KeyEvent) -> KeyResponse {
        if self.keydown.is_none() || event.target.is_text_editable() {
            return KeyResponse::default();
        }

        if !self.chords.iter().any(|chord| chord.matches(event)) {
            return KeyResponse::default();
        }

        (self.callback)();
        KeyResponse {
            handled: true,
            prevent_default: self.options.prevent_default,
            stop_propagation: self.options.stop_propagation,
        }
    }

    pub fn on_window_focus(&mut self) {
        if let Some(id) = self.keydown.take() {
            self.hub.remove_keydown_listener(id);
        }
        self.keydown = Some(self.hub.add_keydown_listener(self.options.use_capture));
    }

    pub fn detach(&mut self) {
        if let Some(id) = self.keydown.take() {
            self.hub.remove_keydown_listener(id);
        }
        if let Some(id) = self.focus.take() {
            self.hub.remove_focus_listener(id);
        }
    }
}

impl<H: ListenerHub> Drop for ShortcutListener<H> {
    fn drop(&mut self) {
        self.detach();
    }
}

pub fn default_chords() -> Vec<KeyChord> {
    vec![
        KeyChord::key("k").with_ctrl(true),
        KeyChord::key("k").with_meta(true),
    ]
}
