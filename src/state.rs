use std::collections::{HashSet, VecDeque};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, FetchError};
use crate::favorites::{
    ConfirmPrompt, Confirmation, FavoriteIntent, FavoriteSet, FavoriteStore, FavoriteUpdate,
};
use crate::persist::BlobStore;
use crate::views::{self, PlayerRow, Screen, TeamFilter, ViewQuery};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub is_captain: bool,
    pub age: u32,
    pub minutes_played: u32,
    /// Percentage, always within `0.0..=100.0`.
    pub passing_accuracy: f32,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatus {
    pub pending_fetches: usize,
    /// Set by the most recent failed fetch, cleared by the next successful one.
    pub last_error: Option<FetchError>,
    /// RFC 3339 time of the last successful fetch.
    pub last_updated: Option<String>,
    pub loaded_once: bool,
}

impl CatalogStatus {
    pub fn is_loading(&self) -> bool {
        self.pending_fetches > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading { id: String },
    Ready(Player),
    NotAvailable { id: String },
    Failed { id: String, error: CatalogError },
}

impl DetailState {
    pub fn is_loading(&self, id: &str) -> bool {
        matches!(self, DetailState::Loading { id: loading } if loading == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenQueries {
    pub browse: ViewQuery,
    pub favorites: ViewQuery,
    pub captains: ViewQuery,
}

impl Default for ScreenQueries {
    fn default() -> Self {
        Self {
            browse: ViewQuery::new(Screen::Browse),
            favorites: ViewQuery::new(Screen::Favorites),
            captains: ViewQuery::new(Screen::Captains),
        }
    }
}

impl ScreenQueries {
    pub fn get(&self, screen: Screen) -> &ViewQuery {
        match screen {
            Screen::Browse => &self.browse,
            Screen::Favorites => &self.favorites,
            Screen::Captains => &self.captains,
        }
    }

    pub fn get_mut(&mut self, screen: Screen) -> &mut ViewQuery {
        match screen {
            Screen::Browse => &mut self.browse,
            Screen::Favorites => &mut self.favorites,
            Screen::Captains => &mut self.captains,
        }
    }
}

/// Everything the screens read. Owned by one thread; the provider only talks to it
/// through [`Delta`]s.
#[derive(Debug)]
pub struct CatalogState {
    pub players: Vec<Player>,
    pub favorites: FavoriteStore,
    pub queries: ScreenQueries,
    pub status: CatalogStatus,
    pub detail: DetailState,
    pub teams: Vec<String>,
    pub logs: VecDeque<String>,
}

impl CatalogState {
    pub fn new(blobs: Box<dyn BlobStore>, config: &CatalogConfig) -> Self {
        let (favorites, loaded) = FavoriteStore::open(blobs, config.favorites_key.clone());
        let mut state = Self {
            players: Vec::new(),
            favorites,
            queries: ScreenQueries::default(),
            status: CatalogStatus::default(),
            detail: DetailState::Idle,
            teams: config.teams.clone(),
            logs: VecDeque::with_capacity(MAX_LOGS),
        };
        match loaded.warning {
            Some(err) => state.push_log(format!("[WARN] Favorites unavailable: {err}")),
            None => state.push_log(format!("[INFO] Loaded {} favorites", loaded.favorites.len())),
        }
        state
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn favorite_set(&self) -> &FavoriteSet {
        self.favorites.favorites()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn player(&self, id: &str) -> Result<&Player, CatalogError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::not_found(id))
    }

    pub fn set_search(&mut self, screen: Screen, term: &str) {
        self.queries.get_mut(screen).search = term.to_string();
    }

    pub fn set_team(&mut self, screen: Screen, team: &str) {
        self.queries.get_mut(screen).team = TeamFilter::parse(team);
    }

    pub fn view(&self, screen: Screen) -> Vec<PlayerRow<'_>> {
        views::derive_rows(&self.players, self.favorite_set(), self.queries.get(screen))
    }

    pub fn team_options(&self) -> Vec<String> {
        views::team_options(&self.players, &self.teams)
    }

    pub fn request_toggle(&self, id: &str) -> PendingConfirmation {
        self.request_toggle_on(Screen::Browse, id)
    }

    pub fn request_toggle_on(&self, screen: Screen, id: &str) -> PendingConfirmation {
        PendingConfirmation::new(FavoriteIntent::toggle(id), self.favorite_set(), screen)
    }

    pub fn request_clear(&self) -> PendingConfirmation {
        PendingConfirmation::new(FavoriteIntent::Clear, self.favorite_set(), Screen::Browse)
    }

    /// Applies the intent only when confirmed. Declining returns `None` and changes nothing.
    pub fn resolve(
        &mut self,
        intent: &FavoriteIntent,
        confirmation: Confirmation,
    ) -> Option<FavoriteUpdate> {
        match confirmation {
            Confirmation::Declined => None,
            Confirmation::Confirmed => Some(self.commit_favorites(intent)),
        }
    }

    pub fn toggle_favorite(&mut self, id: &str) -> FavoriteUpdate {
        self.commit_favorites(&FavoriteIntent::toggle(id))
    }

    pub fn clear_favorites(&mut self) -> FavoriteUpdate {
        self.commit_favorites(&FavoriteIntent::Clear)
    }

    fn commit_favorites(&mut self, intent: &FavoriteIntent) -> FavoriteUpdate {
        let update = self.favorites.apply(intent);
        if let Some(err) = &update.warning {
            self.push_log(format!("[WARN] Favorites not saved: {err}"));
        } else if update.changed {
            let msg = match intent {
                FavoriteIntent::Toggle { id } if update.favorites.contains(id) => {
                    format!("[INFO] Added {id} to favorites")
                }
                FavoriteIntent::Toggle { id } => format!("[INFO] Removed {id} from favorites"),
                FavoriteIntent::Clear => "[INFO] Cleared favorites".to_string(),
            };
            self.push_log(msg);
        }
        update
    }
}

/// An intent together with the yes/no prompt the consumer should show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub intent: FavoriteIntent,
    pub prompt: ConfirmPrompt,
}

impl PendingConfirmation {
    fn new(intent: FavoriteIntent, favorites: &FavoriteSet, screen: Screen) -> Self {
        let prompt = intent.prompt(favorites, screen);
        Self { intent, prompt }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetPlayers(Vec<Player>),
    FetchFailed(FetchError),
    SetPlayerDetail { id: String, player: Player },
    PlayerDetailFailed { id: String, error: CatalogError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchAll,
    FetchPlayer { id: String },
}

/// Deltas are applied in arrival order, so for overlapping fetches the last one to
/// complete replaces the list. Detail results only land while that id is loading.
pub fn apply_delta(state: &mut CatalogState, delta: Delta) {
    match delta {
        Delta::SetPlayers(players) => {
            state.status.pending_fetches = state.status.pending_fetches.saturating_sub(1);
            let (players, dropped) = dedup_players(players);
            if dropped > 0 {
                tracing::warn!(dropped, "catalog response contained duplicate ids");
                state.push_log(format!("[WARN] Dropped {dropped} duplicate player ids"));
            }
            state.push_log(format!("[INFO] Loaded {} players", players.len()));
            state.players = players;
            state.status.last_error = None;
            state.status.last_updated = Some(chrono::Utc::now().to_rfc3339());
            state.status.loaded_once = true;
        }
        Delta::FetchFailed(err) => {
            state.status.pending_fetches = state.status.pending_fetches.saturating_sub(1);
            tracing::warn!(error = %err, "catalog fetch failed");
            state.push_log(format!("[WARN] Catalog fetch failed: {err}"));
            state.status.last_error = Some(err);
        }
        Delta::SetPlayerDetail { id, player } => {
            if !state.detail.is_loading(&id) {
                tracing::debug!(%id, "stale player detail dropped");
                return;
            }
            state.detail = DetailState::Ready(player);
        }
        Delta::PlayerDetailFailed { id, error } => {
            state.push_log(format!("[WARN] Player detail: {error}"));
            if !state.detail.is_loading(&id) {
                return;
            }
            state.detail = match error {
                CatalogError::NotFound { .. } => DetailState::NotAvailable { id },
                error => DetailState::Failed { id, error },
            };
        }
    }
}

fn dedup_players(players: Vec<Player>) -> (Vec<Player>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(players.len());
    let total = players.len();
    let unique: Vec<Player> = players
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect();
    let dropped = total - unique.len();
    (unique, dropped)
}
