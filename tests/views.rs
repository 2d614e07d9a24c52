use player_catalog::views::{
    ViewQuery, captains_view, derive, derive_rows, favorites_view, filter_by_team, search,
    team_options,
};
use player_catalog::{FavoriteSet, Player, Screen, TeamFilter};

fn player(id: &str, name: &str, team: &str, captain: bool, age: u32, minutes: u32) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: team.to_string(),
        position: "Midfielder".to_string(),
        is_captain: captain,
        age,
        minutes_played: minutes,
        passing_accuracy: 80.0,
        image_url: format!("https://example.invalid/{id}.png"),
    }
}

fn squad() -> Vec<Player> {
    vec![
        player("1", "Kevin De Bruyne", "Manchester City", true, 36, 900),
        player("2", "Bruno Fernandes", "Manchester United", true, 30, 100),
        player("3", "Thiago Silva", "Chelsea", true, 40, 200),
        player("4", "Kyle Walker", "Manchester City", false, 37, 50),
        player("5", "Jordan Henderson", "Liverpool", true, 35, 200),
        player("6", "Declan Rice", "Arsenal", false, 26, 1500),
    ]
}

fn ids(players: &[&Player]) -> Vec<String> {
    players.iter().map(|p| p.id.clone()).collect()
}

fn favorites(ids: &[&str]) -> FavoriteSet {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn empty_search_is_identity_in_order() {
    let players = squad();
    let out = search(&players, "");
    assert_eq!(ids(&out), vec!["1", "2", "3", "4", "5", "6"]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let players = squad();
    assert_eq!(ids(&search(&players, "SILVA")), vec!["3"]);
    assert_eq!(ids(&search(&players, "an")), vec!["2", "5", "6"]);
    assert!(search(&players, "zzz").is_empty());
}

#[test]
fn search_is_not_tokenized() {
    let players = squad();
    // Both words exist in the name, but not as one substring.
    assert!(search(&players, "Kevin Bruyne").is_empty());
}

#[test]
fn team_filter_all_is_identity_and_team_is_exact() {
    let players = squad();
    assert_eq!(filter_by_team(&players, &TeamFilter::All).len(), players.len());
    assert_eq!(
        ids(&filter_by_team(&players, &TeamFilter::parse("Manchester City"))),
        vec!["1", "4"]
    );
    assert!(filter_by_team(&players, &TeamFilter::parse("manchester city")).is_empty());
    assert!(filter_by_team(&players, &TeamFilter::parse("Manchester")).is_empty());
}

#[test]
fn captains_view_matches_documented_example() {
    let players = vec![
        player("1", "A", "T", true, 36, 900),
        player("2", "B", "T", true, 30, 100),
        player("3", "C", "T", true, 40, 200),
    ];
    let out = captains_view(&players);
    assert_eq!(ids(&out), vec!["3", "1"]);
}

#[test]
fn captains_view_filters_and_sorts_by_minutes() {
    let players = squad();
    let out = captains_view(&players);
    assert!(out.iter().all(|p| p.is_captain && p.age > 34));
    assert!(out.windows(2).all(|w| w[0].minutes_played <= w[1].minutes_played));
    // Ties on minutes keep canonical order (3 before 5).
    assert_eq!(ids(&out), vec!["3", "5", "1"]);
}

#[test]
fn captains_view_excludes_age_exactly_34() {
    let players = vec![player("1", "A", "T", true, 34, 10)];
    assert!(captains_view(&players).is_empty());
}

#[test]
fn favorites_view_is_intersection_and_drops_orphans() {
    let players = squad();
    let favs = favorites(&["6", "ghost", "2"]);
    let out = favorites_view(&players, &favs);
    assert_eq!(ids(&out), vec!["2", "6"]);
}

#[test]
fn favorites_view_of_empty_set_is_empty() {
    let players = squad();
    assert!(favorites_view(&players, &FavoriteSet::new()).is_empty());
}

#[test]
fn derive_applies_structural_filter_then_search() {
    let players = squad();
    let query = ViewQuery::new(Screen::Captains).with_search("o");
    // Captains are [3, 5, 1]; "o" matches Thiago Silva, Jordan Henderson, but not Kevin De Bruyne.
    assert_eq!(ids(&derive(&players, &FavoriteSet::new(), &query)), vec!["3", "5"]);
}

#[test]
fn derive_browse_with_team_and_search() {
    let players = squad();
    let query = ViewQuery::new(Screen::Browse)
        .with_team(TeamFilter::parse("Manchester City"))
        .with_search("walk");
    assert_eq!(ids(&derive(&players, &FavoriteSet::new(), &query)), vec!["4"]);
}

#[test]
fn derive_is_idempotent() {
    let players = squad();
    let favs = favorites(&["1", "3"]);
    for screen in [Screen::Browse, Screen::Favorites, Screen::Captains] {
        let query = ViewQuery::new(screen).with_search("i");
        let first = ids(&derive(&players, &favs, &query));
        let second = ids(&derive(&players, &favs, &query));
        assert_eq!(first, second);
    }
}

#[test]
fn rows_carry_favorite_icon_state() {
    let players = squad();
    let favs = favorites(&["3"]);
    let rows = derive_rows(&players, &favs, &ViewQuery::new(Screen::Captains));
    let flags: Vec<(String, bool)> = rows
        .iter()
        .map(|row| (row.player.id.clone(), row.favorite))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("3".to_string(), true),
            ("5".to_string(), false),
            ("1".to_string(), false)
        ]
    );
}

#[test]
fn team_options_lead_with_all_then_configured_then_seen() {
    let players = squad();
    let configured = vec!["Chelsea".to_string(), "Arsenal".to_string()];
    let options = team_options(&players, &configured);
    assert_eq!(
        options,
        vec![
            "All",
            "Chelsea",
            "Arsenal",
            "Manchester City",
            "Manchester United",
            "Liverpool"
        ]
    );
}
