use std::collections::BTreeSet;

use crate::error::PersistenceError;
use crate::persist::BlobStore;
use crate::views::Screen;

pub type FavoriteSet = BTreeSet<String>;

/// Outcome of a load or mutation. `warning` carries a persistence failure; the
/// in-memory set still reflects the attempted change when it is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteUpdate {
    pub favorites: FavoriteSet,
    pub changed: bool,
    pub warning: Option<PersistenceError>,
}

/// Sole owner of the favorite ids. Every screen reads through the same store, and every
/// mutation is a single read-modify-persist step on it.
pub struct FavoriteStore {
    key: String,
    blobs: Box<dyn BlobStore>,
    ids: FavoriteSet,
}

impl std::fmt::Debug for FavoriteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteStore")
            .field("key", &self.key)
            .field("ids", &self.ids)
            .finish()
    }
}

impl FavoriteStore {
    /// Creates the store and loads the persisted set. A load failure leaves it empty.
    pub fn open(blobs: Box<dyn BlobStore>, key: impl Into<String>) -> (Self, FavoriteUpdate) {
        let mut store = Self {
            key: key.into(),
            blobs,
            ids: FavoriteSet::new(),
        };
        let loaded = store.load();
        (store, loaded)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Re-reads the persisted set. Missing storage is an empty set. On a read or decode
    /// failure the current in-memory set is kept.
    pub fn load(&mut self) -> FavoriteUpdate {
        let loaded = self
            .blobs
            .get(&self.key)
            .and_then(|raw| decode_favorites(&self.key, raw.as_deref()));
        match loaded {
            Ok(ids) => {
                let changed = ids != self.ids;
                self.ids = ids;
                self.snapshot(changed, None)
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to load favorites");
                self.snapshot(false, Some(err))
            }
        }
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn toggle(&mut self, id: &str) -> FavoriteUpdate {
        let mut next = self.ids.clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        self.commit(next)
    }

    pub fn add(&mut self, id: &str) -> FavoriteUpdate {
        if self.ids.contains(id) {
            return self.snapshot(false, None);
        }
        let mut next = self.ids.clone();
        next.insert(id.to_string());
        self.commit(next)
    }

    pub fn remove(&mut self, id: &str) -> FavoriteUpdate {
        if !self.ids.contains(id) {
            return self.snapshot(false, None);
        }
        let mut next = self.ids.clone();
        next.remove(id);
        self.commit(next)
    }

    /// Always writes, so a stale blob on disk is emptied even when memory already is.
    pub fn clear(&mut self) -> FavoriteUpdate {
        self.commit(FavoriteSet::new())
    }

    pub fn apply(&mut self, intent: &FavoriteIntent) -> FavoriteUpdate {
        match intent {
            FavoriteIntent::Toggle { id } => self.toggle(id),
            FavoriteIntent::Clear => self.clear(),
        }
    }

    // The persisted write happens before the in-memory swap.
    fn commit(&mut self, next: FavoriteSet) -> FavoriteUpdate {
        let changed = next != self.ids;
        let warning = encode_favorites(&next)
            .and_then(|raw| self.blobs.set(&self.key, &raw))
            .err();
        if let Some(err) = &warning {
            tracing::warn!(key = %self.key, error = %err, "favorites kept in memory only");
        }
        self.ids = next;
        self.snapshot(changed, warning)
    }

    fn snapshot(&self, changed: bool, warning: Option<PersistenceError>) -> FavoriteUpdate {
        FavoriteUpdate {
            favorites: self.ids.clone(),
            changed,
            warning,
        }
    }
}

pub fn encode_favorites(ids: &FavoriteSet) -> Result<String, PersistenceError> {
    serde_json::to_string(ids).map_err(|err| PersistenceError::Encode(err.to_string()))
}

/// Accepts a JSON array of strings. `None`, blank and `null` are an empty set;
/// duplicates collapse.
pub fn decode_favorites(key: &str, raw: Option<&str>) -> Result<FavoriteSet, PersistenceError> {
    let Some(raw) = raw else {
        return Ok(FavoriteSet::new());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(FavoriteSet::new());
    }
    let ids: Vec<String> =
        serde_json::from_str(trimmed).map_err(|err| PersistenceError::Decode {
            key: key.to_string(),
            message: err.to_string(),
        })?;
    Ok(ids.into_iter().collect())
}

/// A favorite mutation the user asked for but has not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteIntent {
    Toggle { id: String },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: String,
}

impl FavoriteIntent {
    pub fn toggle(id: impl Into<String>) -> Self {
        FavoriteIntent::Toggle { id: id.into() }
    }

    /// Wording depends on the current membership, so build it right before showing it.
    /// Removing from the Favorites screen gets its own wording.
    pub fn prompt(&self, favorites: &FavoriteSet, screen: Screen) -> ConfirmPrompt {
        match self {
            FavoriteIntent::Toggle { id } => {
                let removing = favorites.contains(id);
                if removing && screen == Screen::Favorites {
                    return ConfirmPrompt {
                        title: "Remove from Favorites",
                        message: "Are you sure you want to remove this item from your favorites?"
                            .to_string(),
                    };
                }
                let action = if removing { "remove from" } else { "add to" };
                ConfirmPrompt {
                    title: "Confirm Action",
                    message: format!("Are you sure you want to {action} favorites?"),
                }
            }
            FavoriteIntent::Clear => ConfirmPrompt {
                title: "Clear Favorites",
                message: "Are you sure you want to remove all players from favorites?"
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_tolerates_missing_blank_null_and_duplicates() {
        assert!(decode_favorites("favorites", None).expect("none").is_empty());
        assert!(decode_favorites("favorites", Some("  ")).expect("blank").is_empty());
        assert!(decode_favorites("favorites", Some("null")).expect("null").is_empty());
        let ids = decode_favorites("favorites", Some(r#"["2","1","2"]"#)).expect("array");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn decode_rejects_non_string_arrays() {
        let err = decode_favorites("favorites", Some("[1,2]")).expect_err("numbers");
        assert!(matches!(err, PersistenceError::Decode { .. }));
    }

    #[test]
    fn encode_is_a_sorted_json_array() {
        let ids: FavoriteSet = ["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(encode_favorites(&ids).expect("encode"), r#"["a","b"]"#);
    }

    #[test]
    fn prompt_wording_follows_membership() {
        let mut favorites = FavoriteSet::new();
        let intent = FavoriteIntent::toggle("7");
        assert_eq!(
            intent.prompt(&favorites, Screen::Browse).message,
            "Are you sure you want to add to favorites?"
        );
        favorites.insert("7".to_string());
        assert_eq!(
            intent.prompt(&favorites, Screen::Captains).message,
            "Are you sure you want to remove from favorites?"
        );
        assert_eq!(
            FavoriteIntent::Clear.prompt(&favorites, Screen::Browse).title,
            "Clear Favorites"
        );
    }

    #[test]
    fn favorites_screen_removal_has_its_own_wording() {
        let favorites: FavoriteSet = ["7".to_string()].into_iter().collect();
        let prompt = FavoriteIntent::toggle("7").prompt(&favorites, Screen::Favorites);
        assert_eq!(prompt.title, "Remove from Favorites");
        assert_eq!(
            prompt.message,
            "Are you sure you want to remove this item from your favorites?"
        );

        // An id that is no longer a favorite falls back to the generic wording.
        let stale = FavoriteIntent::toggle("8").prompt(&favorites, Screen::Favorites);
        assert_eq!(stale.title, "Confirm Action");
    }
}
