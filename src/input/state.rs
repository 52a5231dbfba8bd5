//! Per-frame input snapshot

use super::Action;

/// Actions held during one frame, plus a switch that suspends player
/// control entirely (level transitions, cutscenes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: [bool; 6],
    pub suspended: bool,
}

impl InputSnapshot {
    /// Nothing held.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Snapshot with the given actions held.
    pub fn holding(actions: &[Action]) -> Self {
        let mut snapshot = Self::default();
        for &action in actions {
            snapshot.press(action);
        }
        snapshot
    }

    pub fn suspended() -> Self {
        Self {
            suspended: true,
            ..Self::default()
        }
    }

    fn slot(action: Action) -> usize {
        match action {
            Action::MoveLeft => 0,
            Action::MoveRight => 1,
            Action::Jump => 2,
            Action::Attack => 3,
            Action::Shoot => 4,
            Action::Guard => 5,
        }
    }

    pub fn press(&mut self, action: Action) {
        self.held[Self::slot(action)] = true;
    }

    pub fn release(&mut self, action: Action) {
        self.held[Self::slot(action)] = false;
    }

    /// Check if action is held this frame
    pub fn action_down(&self, action: Action) -> bool {
        self.held[Self::slot(action)]
    }

    /// -1.0, 0.0 or 1.0. Opposite directions cancel out.
    pub fn horizontal(&self) -> f32 {
        let mut x = 0.0;
        if self.action_down(Action::MoveLeft) {
            x -= 1.0;
        }
        if self.action_down(Action::MoveRight) {
            x += 1.0;
        }
        x
    }

    /// Actions currently held, in declaration order.
    pub fn held(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|&a| self.action_down(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_cancels() {
        let both = InputSnapshot::holding(&[Action::MoveLeft, Action::MoveRight]);
        assert_eq!(both.horizontal(), 0.0);
        assert_eq!(InputSnapshot::holding(&[Action::MoveLeft]).horizontal(), -1.0);
        assert_eq!(InputSnapshot::idle().horizontal(), 0.0);
    }

    #[test]
    fn test_press_release() {
        let mut input = InputSnapshot::idle();
        input.press(Action::Shoot);
        assert!(input.action_down(Action::Shoot));
        assert_eq!(input.held().collect::<Vec<_>>(), vec![Action::Shoot]);
        input.release(Action::Shoot);
        assert!(!input.action_down(Action::Shoot));
    }

    #[test]
    fn test_suspended_holds_nothing() {
        let input = InputSnapshot::suspended();
        assert!(input.suspended);
        assert_eq!(input.held().count(), 0);
    }
}
