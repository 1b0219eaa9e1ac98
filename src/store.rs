use chrono::Utc;
use log::{debug, info, trace};

use crate::{Idea, Metrics, PlanError, Result, Status};

/// Holds the canonical list of ideas and the metrics derived from it.
///
/// The store is owned by the session that creates it; every mutation
/// recomputes the metrics before returning.
#[derive(Debug, Clone, Default)]
pub struct IdeaStore {
    /// Ideas in insertion order
    ideas: Vec<Idea>,

    /// Metrics for `ideas` as of the last mutation
    metrics: Metrics,
}

impl IdeaStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `ideas`
    pub fn with_ideas(ideas: Vec<Idea>) -> Self {
        let mut store = Self::new();
        store.set_all(ideas);
        store
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    /// Retrieves an idea by its ID
    pub fn get(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == id)
    }

    /// Replaces the entire idea list.
    ///
    /// Used by CSV import; the caller is trusted to hand over validated ideas.
    pub fn set_all(&mut self, ideas: Vec<Idea>) {
        info!(
            "Replacing {} ideas with {} ideas",
            self.ideas.len(),
            ideas.len()
        );
        self.ideas = ideas;
        self.recompute_metrics();
    }

    /// Appends a new idea
    ///
    /// # Arguments
    ///
    /// * `idea` - A fully formed idea, id and timestamps already assigned
    ///
    /// # Returns
    ///
    /// An error if an idea with the same ID is already stored
    pub fn add(&mut self, idea: Idea) -> Result<()> {
        if self.get(&idea.id).is_some() {
            return Err(PlanError::IdeaAlreadyExists { id: idea.id });
        }

        debug!("Adding idea: {}", idea.id);
        self.ideas.push(idea);
        self.recompute_metrics();
        Ok(())
    }

    /// Replaces the idea whose ID matches `idea.id`.
    ///
    /// Returns `false` and leaves the store untouched when no idea matches.
    pub fn update(&mut self, idea: Idea) -> bool {
        match self.ideas.iter_mut().find(|existing| existing.id == idea.id) {
            Some(existing) => {
                debug!("Updating idea: {}", idea.id);
                *existing = idea;
                self.recompute_metrics();
                true
            }
            None => {
                debug!("Update ignored, no idea with ID {}", idea.id);
                false
            }
        }
    }

    /// Removes the idea with the given ID, returning it if it was present
    pub fn remove(&mut self, id: &str) -> Option<Idea> {
        let position = self.ideas.iter().position(|idea| idea.id == id)?;
        let removed = self.ideas.remove(position);
        debug!("Removed idea: {}", id);
        self.recompute_metrics();
        Some(removed)
    }

    /// Moves an idea to another pipeline stage.
    ///
    /// Returns `Ok(false)` when the idea is already in `status`; otherwise
    /// sets the status, refreshes `updated_at` and returns `Ok(true)`.
    pub fn move_to_status(&mut self, id: &str, status: Status) -> Result<bool> {
        let mut idea = self
            .get(id)
            .cloned()
            .ok_or_else(|| PlanError::IdeaNotFound { id: id.to_string() })?;

        if idea.status == status {
            trace!("Idea {} already in {}", id, status);
            return Ok(false);
        }

        info!("Moving idea {} from {} to {}", id, idea.status, status);
        idea.status = status;
        idea.touch();
        Ok(self.update(idea))
    }

    /// Ideas in the given pipeline stage, in store order
    pub fn ideas_by_status(&self, status: Status) -> Vec<&Idea> {
        self.ideas
            .iter()
            .filter(|idea| idea.status == status)
            .collect()
    }

    /// Retrieves all ideas carrying `tag`, compared case-insensitively
    pub fn ideas_by_tag(&self, tag: &str) -> Vec<&Idea> {
        let search_tag = tag.trim().to_lowercase();

        self.ideas
            .iter()
            .filter(|idea| {
                idea.tags
                    .iter()
                    .any(|t| t.trim().to_lowercase() == search_tag)
            })
            .collect()
    }

    /// Searches ideas by title and content using fuzzy matching.
    /// Returns matches sorted by relevance, title hits weighted double.
    pub fn search(&self, query: &str) -> Vec<&Idea> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();

        let mut scored: Vec<(i64, &Idea)> = self
            .ideas
            .iter()
            .filter_map(|idea| {
                let title_score = matcher.fuzzy_match(&idea.title, query).unwrap_or(0);
                let content_score = matcher.fuzzy_match(&idea.content, query).unwrap_or(0);
                let score = title_score * 2 + content_score;
                (score > 0).then_some((score, idea))
            })
            .collect();

        // Stable sort keeps store order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!("Search '{}' matched {} ideas", query, scored.len());
        scored.into_iter().map(|(_, idea)| idea).collect()
    }

    fn recompute_metrics(&mut self) {
        self.metrics = Metrics::compute(&self.ideas, Utc::now());
        trace!("Metrics recomputed: {:?}", self.metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(title: &str, status: Status) -> Idea {
        Idea::new(title.into(), format!("{} body", title), vec![]).with_status(status)
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut store = IdeaStore::new();
        let first = idea("one", Status::Draft);
        store.add(first.clone()).unwrap();

        let err = store.add(first).unwrap_err();
        assert!(matches!(err, PlanError::IdeaAlreadyExists { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut store = IdeaStore::with_ideas(vec![idea("one", Status::Draft)]);
        let before = store.ideas().to_vec();

        assert!(!store.update(idea("stranger", Status::Ready)));
        assert_eq!(store.ideas(), before.as_slice());
        assert_eq!(store.metrics().drafts, 1);
    }

    #[test]
    fn remove_updates_metrics() {
        let a = idea("a", Status::Review);
        let id = a.id.clone();
        let mut store = IdeaStore::with_ideas(vec![a, idea("b", Status::Draft)]);

        assert!(store.remove(&id).is_some());
        assert!(store.remove(&id).is_none());
        assert_eq!(store.metrics().total_ideas, 1);
        assert_eq!(store.metrics().in_review, 0);
    }

    #[test]
    fn move_to_status_shifts_buckets() {
        let a = idea("a", Status::Draft);
        let id = a.id.clone();
        let mut store = IdeaStore::with_ideas(vec![a]);

        assert!(!store.move_to_status(&id, Status::Draft).unwrap());
        assert!(store.move_to_status(&id, Status::Ready).unwrap());
        assert_eq!(store.get(&id).unwrap().status, Status::Ready);
        assert_eq!(store.metrics().drafts, 0);
        assert_eq!(store.metrics().ready, 1);

        let err = store.move_to_status("missing", Status::Ready).unwrap_err();
        assert!(matches!(err, PlanError::IdeaNotFound { .. }));
    }

    #[test]
    fn filters_by_tag_ignoring_case() {
        let mut tagged = idea("tagged", Status::Draft);
        tagged.tags = vec!["Rust".into(), "career".into()];
        let store = IdeaStore::with_ideas(vec![tagged, idea("plain", Status::Draft)]);

        let found = store.ideas_by_tag(" rust ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "tagged");
    }

    #[test]
    fn search_prefers_title_matches() {
        let by_title = Idea::new("hiring tips".into(), "notes".into(), vec![]);
        let by_content = Idea::new("notes".into(), "hiring tips".into(), vec![]);
        let store = IdeaStore::with_ideas(vec![by_content, by_title]);

        let results = store.search("hiring");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "hiring tips");
        assert!(store.search("zzzz").is_empty());
    }
}
