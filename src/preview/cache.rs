use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Eviction rules for [`ImageCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Least recently used entries are dropped beyond this count
    pub max_entries: usize,
    /// Entries older than this are treated as missing
    pub ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_entries: 64,
            ttl: Some(Duration::from_secs(15 * 60)),
        }
    }
}

struct Entry {
    data_uri: String,
    inserted: Instant,
    last_used: u64,
}

/// URL -> data URI cache for rendered images
pub struct ImageCache {
    policy: CachePolicy,
    entries: HashMap<String, Entry>,
    tick: u64,
}

impl ImageCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        match self.policy.ttl {
            Some(ttl) => now.duration_since(entry.inserted) >= ttl,
            None => false,
        }
    }

    pub fn get(&mut self, url: &str) -> Option<String> {
        self.get_at(url, Instant::now())
    }

    fn get_at(&mut self, url: &str, now: Instant) -> Option<String> {
        let expired = match self.entries.get(url) {
            Some(entry) => self.is_expired(entry, now),
            None => return None,
        };
        if expired {
            self.entries.remove(url);
            return None;
        }

        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(url).map(|entry| {
            entry.last_used = tick;
            entry.data_uri.clone()
        })
    }

    pub fn insert(&mut self, url: String, data_uri: String) {
        self.insert_at(url, data_uri, Instant::now());
    }

    fn insert_at(&mut self, url: String, data_uri: String, now: Instant) {
        if self.policy.max_entries == 0 {
            return;
        }
        self.tick += 1;
        self.entries.insert(
            url,
            Entry {
                data_uri,
                inserted: now,
                last_used: self.tick,
            },
        );

        while self.entries.len() > self.policy.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(url, _)| url.clone());
            match oldest {
                Some(url) => {
                    log::debug!("preview: evicting {}", url);
                    self.entries.remove(&url);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
