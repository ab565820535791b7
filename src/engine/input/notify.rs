// Configuration-changed notifications
//
// Explicit subscription handles replace public event fields: a listener is
// registered once, gets an id back, and stays registered until unsubscribed.

use super::kind::PlayerId;
use log::debug;

/// Receives configuration-changed notifications
pub trait ConfigurationListener {
    fn on_configuration_changed(&mut self, player: PlayerId);
}

impl<F: FnMut(PlayerId)> ConfigurationListener for F {
    fn on_configuration_changed(&mut self, player: PlayerId) {
        self(player)
    }
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener list with id-based removal
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<(SubscriptionId, Box<dyn ConfigurationListener>)>,
    next_id: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl ConfigurationListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the id was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, player: PlayerId) {
        debug!("Configuration changed for {}", player);
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_configuration_changed(player);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
