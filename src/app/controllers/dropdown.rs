/// Toolbar dropdown menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dropdown {
    BlockType,
    Alignment,
}

/// Which toolbar dropdown, if any, is open. At most one is open at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropdownState {
    open: Option<Dropdown>,
}

impl DropdownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_menu(&self) -> Option<Dropdown> {
        self.open
    }

    pub fn is_open(&self, dropdown: Dropdown) -> bool {
        self.open == Some(dropdown)
    }

    /// Button press on a dropdown's trigger: open it, or close it if it
    /// was already open.
    pub fn toggle(&mut self, dropdown: Dropdown) {
        self.open = if self.is_open(dropdown) { None } else { Some(dropdown) };
    }

    /// An entry was picked from `dropdown`. Returns `true` if the menu was
    /// open (and is now closed).
    pub fn select(&mut self, dropdown: Dropdown) -> bool {
        if self.is_open(dropdown) {
            self.open = None;
            true
        } else {
            false
        }
    }

    /// Pointer press somewhere in the window. `hit` is the dropdown whose
    /// bounds contain the press, if any. Returns `true` if a menu closed.
    pub fn pointer_pressed(&mut self, hit: Option<Dropdown>) -> bool {
        match self.open {
            Some(open) if hit != Some(open) => {
                self.open = None;
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_opens_and_closes() {
        let mut state = DropdownState::new();
        state.toggle(Dropdown::BlockType);
        assert!(state.is_open(Dropdown::BlockType));
        state.toggle(Dropdown::BlockType);
        assert_eq!(state.open_menu(), None);
    }

    #[test]
    fn test_opening_one_closes_the_other() {
        let mut state = DropdownState::new();
        state.toggle(Dropdown::BlockType);
        state.toggle(Dropdown::Alignment);
        assert!(state.is_open(Dropdown::Alignment));
        assert!(!state.is_open(Dropdown::BlockType));
    }

    #[test]
    fn test_select_closes() {
        let mut state = DropdownState::new();
        state.toggle(Dropdown::Alignment);
        assert!(state.select(Dropdown::Alignment));
        assert_eq!(state.open_menu(), None);
        assert!(!state.select(Dropdown::Alignment));
    }

    #[test]
    fn test_press_outside_closes_press_inside_keeps() {
        let mut state = DropdownState::new();
        state.toggle(Dropdown::BlockType);
        assert!(!state.pointer_pressed(Some(Dropdown::BlockType)));
        assert!(state.is_open(Dropdown::BlockType));
        assert!(state.pointer_pressed(None));
        assert_eq!(state.open_menu(), None);

        state.toggle(Dropdown::BlockType);
        assert!(state.pointer_pressed(Some(Dropdown::Alignment)));
    }
}
