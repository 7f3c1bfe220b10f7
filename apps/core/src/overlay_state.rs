use crate::sections::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    OpenAndFocus,
    FocusExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    dialog_open: bool,
    current_view: Option<Section>,
    teaching_tip_visible: bool,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        self.dialog_open
    }

    pub fn current_view(&self) -> Option<Section> {
        self.current_view
    }

    pub fn teaching_tip_visible(&self) -> bool {
        self.teaching_tip_visible
    }

    pub fn on_shortcut(&mut self) -> ShortcutAction {
        if self.dialog_open {
            return ShortcutAction::FocusExisting;
        }
        self.dialog_open = true;
        ShortcutAction::OpenAndFocus
    }

    pub fn open(&mut self) {
        self.dialog_open = true;
    }

    /// Returns true when the dialog was open. Closing leaves the section view.
    pub fn close(&mut self) -> bool {
        let was_open = self.dialog_open;
        self.dialog_open = false;
        self.current_view = None;
        was_open
    }

    pub fn on_escape(&mut self) -> bool {
        self.close()
    }

    pub fn enter_section(&mut self, section: Section) {
        self.current_view = Some(section);
    }

    pub fn back_to_search(&mut self) -> bool {
        self.current_view.take().is_some()
    }

    pub fn show_teaching_tip(&mut self) {
        self.teaching_tip_visible = true;
    }

    pub fn dismiss_teaching_tip(&mut self) -> bool {
        std::mem::replace(&mut self.teaching_tip_visible, false)
    }
}
