// Tab strip navigation: enabled tabs, roving focus and arrow-key cycling.

use super::completion::Completed;

/// Viewport width (terminal columns) at or below which the tab strip is vertical.
pub const VERTICAL_BREAKPOINT: u16 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width <= breakpoint {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn next_key(&self) -> NavKey {
        match self {
            Orientation::Horizontal => NavKey::ArrowRight,
            Orientation::Vertical => NavKey::ArrowDown,
        }
    }

    pub fn previous_key(&self) -> NavKey {
        match self {
            Orientation::Horizontal => NavKey::ArrowLeft,
            Orientation::Vertical => NavKey::ArrowUp,
        }
    }
}

/// Keys the tab strip reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKeyOutcome {
    /// Focus moved to another tab; nothing is activated.
    FocusMoved(usize),
    /// The focused tab asks to become the active step.
    Activate(usize),
    Ignored,
}

/// Tab `index` can be focused and activated when it is the first one, is itself completed, or
/// follows a completed step.
pub fn is_tab_enabled(index: usize, completed: &Completed) -> bool {
    index == 0 || completed.is_completed(index) || completed.predecessor_completed(index)
}

pub fn enabled_tabs(tab_count: usize, completed: &Completed) -> Vec<usize> {
    (0..tab_count)
        .filter(|i| is_tab_enabled(*i, completed))
        .collect()
}

#[derive(Debug, Clone)]
pub struct TabNavigation {
    tab_count: usize,
    focused: usize,
    orientation: Orientation,
    focus_requested: bool,
}

impl TabNavigation {
    pub fn new(tab_count: usize, orientation: Orientation) -> Self {
        Self {
            tab_count,
            focused: 0,
            orientation,
            focus_requested: false,
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tab_count
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Put focus on `index` directly (pointer focus, or after activation).
    pub fn focus(&mut self, index: usize) {
        if index < self.tab_count {
            self.focused = index;
        }
    }

    /// Roving tabindex: only the active tab sits in the sequential focus order.
    pub fn tab_index(&self, index: usize, active: usize) -> i32 {
        if index == active {
            0
        } else {
            -1
        }
    }

    /// Ask for the active tab to be focused on the next render.
    pub fn request_focus(&mut self) {
        self.focus_requested = true;
    }

    pub fn focus_requested(&self) -> bool {
        self.focus_requested
    }

    /// Consume a pending focus request by focusing the active tab.
    pub fn take_focus_request(&mut self, active: usize) -> Option<usize> {
        if !self.focus_requested {
            return None;
        }
        self.focus_requested = false;
        self.focus(active);
        Some(self.focused)
    }

    pub fn handle_key(&mut self, key: NavKey, completed: &Completed) -> TabKeyOutcome {
        if !is_tab_enabled(self.focused, completed) {
            return TabKeyOutcome::Ignored;
        }

        let target = match key {
            NavKey::Enter | NavKey::Space => return TabKeyOutcome::Activate(self.focused),
            NavKey::Home => enabled_tabs(self.tab_count, completed).first().copied(),
            NavKey::End => enabled_tabs(self.tab_count, completed).last().copied(),
            k if k == self.orientation.next_key() => self.cycle(completed, true),
            k if k == self.orientation.previous_key() => self.cycle(completed, false),
            _ => None,
        };

        match target {
            Some(index) => {
                self.focused = index;
                TabKeyOutcome::FocusMoved(index)
            }
            None => TabKeyOutcome::Ignored,
        }
    }

    fn cycle(&self, completed: &Completed, forward: bool) -> Option<usize> {
        let enabled = enabled_tabs(self.tab_count, completed);
        let pos = enabled.iter().position(|i| *i == self.focused)?;
        let len = enabled.len();
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        enabled.get(next).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(steps: &[usize]) -> Completed {
        steps.iter().copied().collect()
    }

    fn walk(nav: &mut TabNavigation, key: NavKey, c: &Completed, n: usize) -> Vec<usize> {
        (0..n)
            .map(|_| {
                nav.handle_key(key, c);
                nav.focused()
            })
            .collect()
    }

    #[test]
    fn enabled_set_follows_completion() {
        assert_eq!(enabled_tabs(4, &completed(&[])), vec![0]);
        assert_eq!(enabled_tabs(4, &completed(&[0])), vec![0, 1]);
        assert_eq!(enabled_tabs(4, &completed(&[0, 1, 2])), vec![0, 1, 2, 3]);
        assert_eq!(enabled_tabs(3, &completed(&[0, 1])), vec![0, 1, 2]);
    }

    #[test]
    fn arrows_cycle_over_three_tabs_with_organization_app() {
        let c = completed(&[0, 1]);
        let mut nav = TabNavigation::new(3, Orientation::Horizontal);
        assert_eq!(walk(&mut nav, NavKey::ArrowRight, &c, 3), vec![1, 2, 0]);
        assert_eq!(walk(&mut nav, NavKey::ArrowLeft, &c, 3), vec![2, 1, 0]);
    }

    #[test]
    fn arrows_cycle_over_four_tabs_when_all_completed() {
        let c = completed(&[0, 1, 2]);
        let mut nav = TabNavigation::new(4, Orientation::Horizontal);
        assert_eq!(walk(&mut nav, NavKey::ArrowRight, &c, 4), vec![1, 2, 3, 0]);
        assert_eq!(walk(&mut nav, NavKey::ArrowLeft, &c, 4), vec![3, 2, 1, 0]);
    }

    #[test]
    fn arrows_skip_disabled_tabs() {
        let c = completed(&[0]);
        let mut nav = TabNavigation::new(4, Orientation::Horizontal);
        assert_eq!(walk(&mut nav, NavKey::ArrowRight, &c, 3), vec![1, 0, 1]);
        assert_eq!(walk(&mut nav, NavKey::ArrowLeft, &c, 2), vec![0, 1]);
    }

    #[test]
    fn vertical_orientation_uses_up_and_down() {
        let c = completed(&[0]);
        let mut nav = TabNavigation::new(4, Orientation::for_width(80, VERTICAL_BREAKPOINT));
        assert_eq!(nav.orientation(), Orientation::Vertical);
        assert_eq!(nav.handle_key(NavKey::ArrowRight, &c), TabKeyOutcome::Ignored);
        assert_eq!(nav.handle_key(NavKey::ArrowDown, &c), TabKeyOutcome::FocusMoved(1));
        assert_eq!(nav.handle_key(NavKey::ArrowUp, &c), TabKeyOutcome::FocusMoved(0));
        assert_eq!(
            Orientation::for_width(120, VERTICAL_BREAKPOINT),
            Orientation::Horizontal
        );
        assert_eq!(
            Orientation::for_width(VERTICAL_BREAKPOINT, VERTICAL_BREAKPOINT),
            Orientation::Vertical
        );
    }

    #[test]
    fn keys_on_a_disabled_tab_are_ignored() {
        let c = completed(&[]);
        let mut nav = TabNavigation::new(4, Orientation::Horizontal);
        nav.focus(2);
        assert_eq!(nav.handle_key(NavKey::ArrowRight, &c), TabKeyOutcome::Ignored);
        assert_eq!(nav.handle_key(NavKey::Enter, &c), TabKeyOutcome::Ignored);
        assert_eq!(nav.focused(), 2);
    }

    #[test]
    fn home_end_and_activation() {
        let c = completed(&[0, 1]);
        let mut nav = TabNavigation::new(4, Orientation::Horizontal);
        assert_eq!(nav.handle_key(NavKey::End, &c), TabKeyOutcome::FocusMoved(2));
        assert_eq!(nav.handle_key(NavKey::Space, &c), TabKeyOutcome::Activate(2));
        assert_eq!(nav.handle_key(NavKey::Home, &c), TabKeyOutcome::FocusMoved(0));
        assert_eq!(nav.handle_key(NavKey::Enter, &c), TabKeyOutcome::Activate(0));
    }

    #[test]
    fn roving_tab_index_and_focus_handshake() {
        let mut nav = TabNavigation::new(4, Orientation::Horizontal);
        assert_eq!(nav.tab_index(1, 1), 0);
        assert_eq!(nav.tab_index(0, 1), -1);

        assert_eq!(nav.take_focus_request(1), None);
        nav.request_focus();
        assert!(nav.focus_requested());
        assert_eq!(nav.take_focus_request(1), Some(1));
        assert_eq!(nav.focused(), 1);
        assert!(!nav.focus_requested());
    }
}
