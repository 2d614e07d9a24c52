use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::catalog_fetch::{CatalogSource, HttpCatalogSource};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, FetchError};
use crate::favorites::{Confirmation, FavoriteIntent, FavoriteUpdate};
use crate::persist::{BlobStore, FileBlobStore};
use crate::provider::spawn_catalog_provider;
use crate::state::{
    CatalogState, Delta, DetailState, PendingConfirmation, Player, ProviderCommand, apply_delta,
};
use crate::views::{PlayerRow, Screen};

/// Entry point for the screens: owns the state, forwards fetches to the provider thread
/// and applies its results when [`Catalog::pump`] or [`Catalog::wait_idle`] is called.
pub struct Catalog {
    state: CatalogState,
    cmd_tx: Option<Sender<ProviderCommand>>,
    delta_rx: Option<Receiver<Delta>>,
    outstanding: usize,
}

impl Catalog {
    /// HTTP source and on-disk favorites from `config`, with the first fetch already sent.
    pub fn start(config: &CatalogConfig) -> Result<Self> {
        let source = HttpCatalogSource::new(config).context("catalog source")?;
        let blobs = FileBlobStore::from_dir(config.data_dir.clone());
        let mut catalog = Self::with_parts(source, Box::new(blobs), config);
        // A failed send is already recorded in the status and log.
        let _ = catalog.fetch_all();
        Ok(catalog)
    }

    /// Wires a custom source and blob store. No fetch is issued.
    pub fn with_parts<S>(source: S, blobs: Box<dyn BlobStore>, config: &CatalogConfig) -> Self
    where
        S: CatalogSource + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        // The worker exits by itself once `cmd_tx` is dropped.
        spawn_catalog_provider(source, tx, cmd_rx);
        Self {
            state: CatalogState::new(blobs, config),
            cmd_tx: Some(cmd_tx),
            delta_rx: Some(rx),
            outstanding: 0,
        }
    }

    /// Favorites and derivation only; every fetch reports `FetchError::Unavailable`.
    pub fn without_provider(blobs: Box<dyn BlobStore>, config: &CatalogConfig) -> Self {
        Self {
            state: CatalogState::new(blobs, config),
            cmd_tx: None,
            delta_rx: None,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn is_loading(&self) -> bool {
        self.state.status.is_loading()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.state.status.last_error.as_ref()
    }

    pub fn fetch_all(&mut self) -> Result<(), FetchError> {
        self.send(ProviderCommand::FetchAll)?;
        self.state.status.pending_fetches += 1;
        self.state.push_log("[INFO] Catalog request sent");
        Ok(())
    }

    pub fn refresh(&mut self) -> Result<(), FetchError> {
        self.fetch_all()
    }

    pub fn fetch_player(&mut self, id: &str) -> Result<(), FetchError> {
        self.send(ProviderCommand::FetchPlayer { id: id.to_string() })?;
        self.state.detail = DetailState::Loading { id: id.to_string() };
        Ok(())
    }

    /// Looks the player up in the canonical list.
    pub fn player(&self, id: &str) -> Result<&Player, CatalogError> {
        self.state.player(id)
    }

    pub fn detail(&self) -> &DetailState {
        &self.state.detail
    }

    /// Applies every delta that has already arrived. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let next = match &self.delta_rx {
                Some(rx) => rx.try_recv(),
                None => break,
            };
            match next {
                Ok(delta) => {
                    self.apply(delta);
                    applied += 1;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.provider_lost();
                    break;
                }
            }
        }
        applied
    }

    /// Blocks until every sent request has been answered or `timeout` passes.
    /// Returns `true` when nothing is outstanding. A timeout too large to form a
    /// deadline waits without one.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        while self.outstanding > 0 {
            let next = match (&self.delta_rx, deadline) {
                (Some(rx), Some(deadline)) => {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                (Some(rx), None) => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                (None, _) => Err(RecvTimeoutError::Disconnected),
            };
            match next {
                Ok(delta) => self.apply(delta),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => self.provider_lost(),
            }
        }
        self.pump();
        true
    }

    pub fn search(&mut self, term: &str) {
        self.state.set_search(Screen::Browse, term);
    }

    pub fn search_screen(&mut self, screen: Screen, term: &str) {
        self.state.set_search(screen, term);
    }

    pub fn filter_by_team(&mut self, team: &str) {
        self.state.set_team(Screen::Browse, team);
    }

    pub fn team_options(&self) -> Vec<String> {
        self.state.team_options()
    }

    pub fn view(&self, screen: Screen) -> Vec<PlayerRow<'_>> {
        self.state.view(screen)
    }

    pub fn browse_view(&self) -> Vec<PlayerRow<'_>> {
        self.view(Screen::Browse)
    }

    pub fn favorites_view(&self) -> Vec<PlayerRow<'_>> {
        self.view(Screen::Favorites)
    }

    pub fn captains_view(&self) -> Vec<PlayerRow<'_>> {
        self.view(Screen::Captains)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.is_favorite(id)
    }

    pub fn request_toggle(&self, id: &str) -> PendingConfirmation {
        self.state.request_toggle(id)
    }

    /// Same as [`Catalog::request_toggle`], worded for the screen the tap came from.
    pub fn request_toggle_on(&self, screen: Screen, id: &str) -> PendingConfirmation {
        self.state.request_toggle_on(screen, id)
    }

    pub fn request_clear(&self) -> PendingConfirmation {
        self.state.request_clear()
    }

    pub fn resolve(
        &mut self,
        intent: &FavoriteIntent,
        confirmation: Confirmation,
    ) -> Option<FavoriteUpdate> {
        self.state.resolve(intent, confirmation)
    }

    /// Commit step; call only after the user confirmed.
    pub fn toggle_favorite(&mut self, id: &str) -> FavoriteUpdate {
        self.state.toggle_favorite(id)
    }

    /// Commit step; call only after the user confirmed.
    pub fn clear_favorites(&mut self) -> FavoriteUpdate {
        self.state.clear_favorites()
    }

    fn send(&mut self, cmd: ProviderCommand) -> Result<(), FetchError> {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Catalog fetch unavailable");
            return Err(self.unavailable(&cmd));
        };
        if tx.send(cmd.clone()).is_err() {
            self.state.push_log("[WARN] Catalog request failed");
            self.cmd_tx = None;
            return Err(self.unavailable(&cmd));
        }
        self.outstanding += 1;
        Ok(())
    }

    fn unavailable(&mut self, cmd: &ProviderCommand) -> FetchError {
        if matches!(cmd, ProviderCommand::FetchAll) {
            self.state.status.last_error = Some(FetchError::Unavailable);
        }
        FetchError::Unavailable
    }

    fn apply(&mut self, delta: Delta) {
        self.outstanding = self.outstanding.saturating_sub(1);
        apply_delta(&mut self.state, delta);
    }

    fn provider_lost(&mut self) {
        tracing::warn!(outstanding = self.outstanding, "catalog provider stopped");
        self.state.push_log("[WARN] Catalog provider stopped");
        self.outstanding = 0;
        self.state.status.pending_fetches = 0;
        self.cmd_tx = None;
        self.delta_rx = None;
    }
}
