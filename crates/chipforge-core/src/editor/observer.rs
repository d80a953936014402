/// Handle returned by [`Subscribers::subscribe`]; pass it back to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Explicit observer registry.
///
/// Owners keep the returned id and must unsubscribe on tear-down, otherwise
/// the callback keeps firing.
pub struct Subscribers<F: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<F>)>,
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Subscribers<F> {
    pub fn subscribe(&mut self, callback: Box<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    /// Returns false if `id` was not (or no longer) registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Callbacks in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> + '_ {
        self.entries.iter_mut().map(|(_, callback)| callback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> std::fmt::Debug for Subscribers<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut subscribers: Subscribers<dyn FnMut(&mut Vec<u32>)> = Subscribers::default();
        let first = subscribers.subscribe(Box::new(|log: &mut Vec<u32>| log.push(1)));
        let second = subscribers.subscribe(Box::new(|log: &mut Vec<u32>| log.push(2)));
        assert_ne!(first, second);

        let mut log = Vec::new();
        for callback in subscribers.iter_mut() {
            callback(&mut log);
        }
        assert_eq!(log, vec![1, 2]);

        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        log.clear();
        for callback in subscribers.iter_mut() {
            callback(&mut log);
        }
        assert_eq!(log, vec![2]);
        assert_eq!(subscribers.len(), 1);
    }
}
