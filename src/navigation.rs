//! Top-level tab controller. Listens for the navigate-home signal and
//! forces the home tab.

use crate::models::Tab;
use crate::signals::{Signal, SignalReceiver};

pub struct TabNavigator {
    selected: Tab,
    signals: SignalReceiver,
}

impl TabNavigator {
    pub fn new(signals: SignalReceiver) -> Self {
        Self {
            selected: Tab::Home,
            signals,
        }
    }

    pub fn selected(&self) -> Tab {
        self.selected
    }

    pub fn select(&mut self, tab: Tab) {
        self.selected = tab;
    }

    /// Applies pending signals. Returns true if the home tab was forced.
    pub fn process_signals(&mut self) -> bool {
        let reset = self
            .signals
            .drain()
            .into_iter()
            .any(|s| s == Signal::NavigateHome);
        if reset {
            tracing::debug!(from = %self.selected, "Resetting to home tab");
            self.selected = Tab::Home;
        }
        reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalBus;

    #[test]
    fn starts_on_home() {
        let bus = SignalBus::new();
        assert_eq!(TabNavigator::new(bus.subscribe()).selected(), Tab::Home);
    }

    #[test]
    fn navigate_home_resets_tab() {
        let bus = SignalBus::new();
        let mut nav = TabNavigator::new(bus.subscribe());
        nav.select(Tab::Insights);

        bus.broadcast(Signal::EpdsAssessmentCompleted);
        assert!(!nav.process_signals());
        assert_eq!(nav.selected(), Tab::Insights);

        bus.broadcast(Signal::NavigateHome);
        assert!(nav.process_signals());
        assert_eq!(nav.selected(), Tab::Home);
    }

    #[test]
    fn signal_before_subscription_is_missed() {
        let bus = SignalBus::new();
        bus.broadcast(Signal::NavigateHome);
        let mut nav = TabNavigator::new(bus.subscribe());
        nav.select(Tab::Me);
        assert!(!nav.process_signals());
        assert_eq!(nav.selected(), Tab::Me);
    }
}
