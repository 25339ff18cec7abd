//! The "Get Space Images" control.
//!
//! A two-state machine. `begin` is the entry action into `Fetching` (disable,
//! swap in the busy label) and `complete` is the exit action back to `Idle`
//! (enable, restore the label that was showing before).

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Fetching {
        /// Label to put back on completion
        restore_label: String,
    },
}

#[derive(Debug, Clone)]
pub struct Trigger {
    label: String,
    busy_label: String,
    state: TriggerState,
}

impl Trigger {
    pub fn new(label: impl Into<String>, busy_label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            busy_label: busy_label.into(),
            state: TriggerState::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, TriggerState::Idle)
    }

    /// Activate the control. Returns `false` and changes nothing if a fetch
    /// is already running.
    pub fn begin(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let restore_label = std::mem::replace(&mut self.label, self.busy_label.clone());
        self.state = TriggerState::Fetching { restore_label };
        true
    }

    /// Return to idle after a fetch cycle, whatever its outcome
    pub fn complete(&mut self) {
        if let TriggerState::Fetching { restore_label } =
            std::mem::replace(&mut self.state, TriggerState::Idle)
        {
            self.label = restore_label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_disables_and_relabels() {
        let mut trigger = Trigger::new("Get Space Images", "Fetching...");
        assert!(trigger.is_enabled());
        assert!(trigger.begin());
        assert!(!trigger.is_enabled());
        assert_eq!(trigger.label(), "Fetching...");
    }

    #[test]
    fn test_complete_restores() {
        let mut trigger = Trigger::new("Get Space Images", "Fetching...");
        trigger.begin();
        trigger.complete();
        assert!(trigger.is_enabled());
        assert_eq!(trigger.label(), "Get Space Images");
        assert_eq!(trigger.state, TriggerState::Idle);
    }

    #[test]
    fn test_begin_while_fetching_is_ignored() {
        let mut trigger = Trigger::new("Go", "Busy");
        assert!(trigger.begin());
        assert!(!trigger.begin());
        assert_eq!(trigger.label(), "Busy");
        trigger.complete();
        assert_eq!(trigger.label(), "Go");
    }

    #[test]
    fn test_complete_when_idle_is_noop() {
        let mut trigger = Trigger::new("Go", "Busy");
        trigger.complete();
        assert!(trigger.is_enabled());
        assert_eq!(trigger.label(), "Go");
    }
}
