//! Knowledge browser: a fetched FAQ snapshot with a local, case-insensitive filter.

use crate::client::{Client, ClientError};
use crate::messages::FaqEntry;

/// Ticket for an outstanding snapshot fetch.
#[derive(Debug)]
pub struct SnapshotFetch {
    generation: u64,
}

/// Filtered entries of one category, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub entries: Vec<&'a FaqEntry>,
}

#[derive(Debug, Default)]
pub struct KnowledgeBrowser {
    entries: Vec<FaqEntry>,
    query: String,
    loaded: bool,
    active: bool,
    /// Bumped per issued fetch; only the newest fetch may settle the browser.
    generation: u64,
}

impl KnowledgeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the browser. Returns a fetch ticket unless the snapshot is already
    /// loaded for this activation.
    pub fn activate(&mut self) -> Option<SnapshotFetch> {
        self.active = true;
        if self.loaded {
            return None;
        }
        self.generation += 1;
        tracing::debug!(generation = self.generation, "fetching FAQ snapshot");
        Some(SnapshotFetch {
            generation: self.generation,
        })
    }

    /// Settle a fetch. Success replaces the snapshot wholesale; failure is
    /// logged and leaves no entries. Both end the loading state.
    /// Returns false when a newer fetch superseded this one.
    pub fn finish_fetch(
        &mut self,
        fetch: SnapshotFetch,
        result: Result<Vec<FaqEntry>, ClientError>,
    ) -> bool {
        if fetch.generation != self.generation {
            tracing::debug!(
                generation = fetch.generation,
                current = self.generation,
                "discarding superseded FAQ snapshot"
            );
            return false;
        }
        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "FAQ snapshot loaded");
                self.entries = entries;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch FAQs");
                self.entries.clear();
            }
        }
        self.loaded = true;
        true
    }

    /// Activate and, if needed, fetch the snapshot.
    pub async fn activate_and_load(&mut self, client: &Client) {
        if let Some(fetch) = self.activate() {
            let result = client.all_entries().await;
            self.finish_fetch(fetch, result);
        }
    }

    /// Close the browser; the next activation fetches a fresh snapshot.
    /// A fetch still in flight is superseded.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.loaded = false;
        self.generation += 1;
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
    }

    /// Entries whose question or category contains the query, ignoring case.
    pub fn filtered(&self) -> Vec<&FaqEntry> {
        let needle = self.query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.question.to_lowercase().contains(&needle)
                    || e.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Filtered entries grouped by category, categories in first-seen order.
    /// Categories with no match are omitted.
    pub fn groups(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
        for entry in self.filtered() {
            match groups.iter_mut().find(|g| g.category == entry.category) {
                Some(group) => group.entries.push(entry),
                None => groups.push(CategoryGroup {
                    category: &entry.category,
                    entries: vec![entry],
                }),
            }
        }
        groups
    }

    /// Distinct categories of the whole snapshot, first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    /// Pick an entry by id: returns its question for submission and closes the browser.
    pub fn select_entry(&mut self, id: i64) -> Option<String> {
        let question = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.question.clone())?;
        self.deactivate();
        Some(question)
    }
}
