//! Pure derivations from the canonical list and the favorite set.
//!
//! Every function here is a plain recomputation: the same inputs always give the same
//! rows in the same order, so screens can call them on every render pass.

use std::collections::HashSet;

use crate::favorites::FavoriteSet;
use crate::state::Player;

pub const ALL_TEAMS: &str = "All";
pub const CAPTAIN_MIN_AGE_EXCLUSIVE: u32 = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Browse,
    Favorites,
    Captains,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    /// `"All"` and blank input both mean "no team filter".
    pub fn parse(raw: &str) -> Self {
        let team = raw.trim();
        if team.is_empty() || team == ALL_TEAMS {
            TeamFilter::All
        } else {
            TeamFilter::Team(team.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TeamFilter::All => ALL_TEAMS,
            TeamFilter::Team(team) => team,
        }
    }

    pub fn matches(&self, player: &Player) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(team) => player.team == *team,
        }
    }
}

/// Parameters one screen supplies to the derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub screen: Screen,
    pub search: String,
    pub team: TeamFilter,
}

impl ViewQuery {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            search: String::new(),
            team: TeamFilter::All,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_team(mut self, team: TeamFilter) -> Self {
        self.team = team;
        self
    }
}

/// A rendered row: the player plus its favorite-icon state at derivation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerRow<'a> {
    pub player: &'a Player,
    pub favorite: bool,
}

pub fn search<'a, I>(players: I, term: &str) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    players
        .into_iter()
        .filter(|p| name_matches(&p.name, term))
        .collect()
}

pub fn filter_by_team<'a, I>(players: I, team: &TeamFilter) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    players.into_iter().filter(|p| team.matches(p)).collect()
}

pub fn is_captain_candidate(player: &Player) -> bool {
    player.is_captain && player.age > CAPTAIN_MIN_AGE_EXCLUSIVE
}

/// Captains older than 34, fewest minutes first. Ties keep canonical order.
pub fn captains_view(players: &[Player]) -> Vec<&Player> {
    let mut out: Vec<&Player> = players.iter().filter(|p| is_captain_candidate(p)).collect();
    out.sort_by_key(|p| p.minutes_played);
    out
}

/// Canonical players whose id is favorited, in canonical order. Orphaned ids yield nothing.
pub fn favorites_view<'a>(players: &'a [Player], favorites: &FavoriteSet) -> Vec<&'a Player> {
    players
        .iter()
        .filter(|p| favorites.contains(&p.id))
        .collect()
}

pub fn is_favorite(favorites: &FavoriteSet, player: &Player) -> bool {
    favorites.contains(&player.id)
}

/// Structural filter for the screen first, then the team filter, then search.
pub fn derive<'a>(
    players: &'a [Player],
    favorites: &FavoriteSet,
    query: &ViewQuery,
) -> Vec<&'a Player> {
    let base = match query.screen {
        Screen::Browse => players.iter().collect::<Vec<_>>(),
        Screen::Favorites => favorites_view(players, favorites),
        Screen::Captains => captains_view(players),
    };
    let teamed = filter_by_team(base, &query.team);
    search(teamed, &query.search)
}

pub fn derive_rows<'a>(
    players: &'a [Player],
    favorites: &FavoriteSet,
    query: &ViewQuery,
) -> Vec<PlayerRow<'a>> {
    derive(players, favorites, query)
        .into_iter()
        .map(|player| PlayerRow {
            player,
            favorite: is_favorite(favorites, player),
        })
        .collect()
}

/// Filter chips: `"All"`, then configured teams, then any other team present in the list.
pub fn team_options(players: &[Player], configured: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = vec![ALL_TEAMS.to_string()];
    seen.insert(ALL_TEAMS);
    for team in configured {
        if seen.insert(team.as_str()) {
            out.push(team.clone());
        }
    }
    for player in players {
        let team = player.team.as_str();
        if team.is_empty() {
            continue;
        }
        if seen.insert(team) {
            out.push(team.to_string());
        }
    }
    out
}

/// Case-insensitive substring match. An empty term matches everything.
pub fn name_matches(name: &str, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    if name.is_ascii() && term.is_ascii() {
        return contains_ascii_ci(name, term);
    }
    name.to_lowercase().contains(&term.to_lowercase())
}

fn contains_ascii_ci(haystack: &str, needle: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.len() > h.len() {
        return false;
    }
    h.windows(n.len())
        .any(|window| window.iter().zip(n).all(|(a, b)| a.eq_ignore_ascii_case(b)))
}
