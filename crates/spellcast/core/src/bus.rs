//! Named, multi-subscriber notification channel that drives the simulation.
//!
//! The bus stores typed handles rather than callbacks: broadcasting a topic
//! returns a snapshot of the subscribed handles in subscription order and the
//! owner of the bus dispatches them one at a time. That keeps every handler
//! free to subscribe or unsubscribe (itself or others) while a broadcast is in
//! progress without any re-entrancy:
//!
//! - a handle subscribed during a broadcast is first delivered on the next one
//! - a handle unsubscribed during a broadcast is skipped if it has not run yet
//!   (callers check [`TickBus::is_subscribed`] before dispatching)

use std::collections::BTreeMap;

/// Topic every per-frame handler subscribes to.
pub const TICK: &str = "tick";

/// Opaque handle returned by [`TickBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(u64);

#[derive(Clone, Debug)]
struct Subscription<H> {
    id: SubscriptionId,
    handle: H,
}

/// Topic-keyed subscriber registry.
#[derive(Clone, Debug)]
pub struct TickBus<H> {
    topics: BTreeMap<String, Vec<Subscription<H>>>,
    index: BTreeMap<SubscriptionId, String>,
    next_id: u64,
}

impl<H: Clone> TickBus<H> {
    pub fn new() -> Self {
        Self {
            topics: BTreeMap::new(),
            index: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Subscribes `handle` to `topic`, appending it after existing subscribers.
    pub fn subscribe(&mut self, topic: &str, handle: H) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.topics
            .entry(topic.to_owned())
            .or_default()
            .push(Subscription { id, handle });
        self.index.insert(id, topic.to_owned());
        id
    }

    /// Removes a subscription. Returns false if it was not (or no longer) active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(topic) = self.index.remove(&id) else {
            return false;
        };
        if let Some(subscribers) = self.topics.get_mut(&topic) {
            subscribers.retain(|sub| sub.id != id);
            if subscribers.is_empty() {
                self.topics.remove(&topic);
            }
        }
        true
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.index.contains_key(&id)
    }

    /// Snapshot of the subscribers of `topic`, in subscription order.
    pub fn broadcast(&self, topic: &str) -> Vec<(SubscriptionId, H)> {
        self.topics
            .get(topic)
            .map(|subs| {
                subs.iter()
                    .map(|sub| (sub.id, sub.handle.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }

    /// Total active subscriptions across every topic.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Per-topic subscriber counts for topics matching a wildcard pattern.
    ///
    /// Tooling only; dispatch never goes through pattern matching.
    pub fn subscribers_matching(&self, pattern: &TopicPattern) -> Vec<(&str, usize)> {
        self.topics
            .iter()
            .filter(|(topic, _)| pattern.matches(topic))
            .map(|(topic, subs)| (topic.as_str(), subs.len()))
            .collect()
    }
}

impl<H: Clone> Default for TickBus<H> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Topic patterns
// ============================================================================

/// Glob-style topic pattern: `*` matches any run of characters, `?` exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicPattern {
    pattern: Vec<char>,
}

impl TopicPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
        }
    }

    pub fn matches(&self, topic: &str) -> bool {
        let text: Vec<char> = topic.chars().collect();
        let (mut p, mut t) = (0, 0);
        // Position of the last `*` and the text index it is currently absorbing up to.
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.pattern.get(p) {
                Some('*') => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(&c) if c == '?' || c == text[t] => {
                    p += 1;
                    t += 1;
                }
                _ => match backtrack {
                    Some((star, absorbed)) => {
                        p = star + 1;
                        t = absorbed + 1;
                        backtrack = Some((star, absorbed + 1));
                    }
                    None => return false,
                },
            }
        }

        self.pattern[p..].iter().all(|&c| c == '*')
    }
}
