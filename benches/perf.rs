use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use player_catalog::catalog_fetch::parse_players_json;
use player_catalog::views::{ViewQuery, captains_view, derive_rows};
use player_catalog::{FavoriteSet, Player, Screen, TeamFilter};

const TEAMS: &[&str] = &[
    "Manchester City",
    "Liverpool",
    "Chelsea",
    "Manchester United",
    "Arsenal",
    "Tottenham Hotspur",
];

fn sample_players(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player {
            id: i.to_string(),
            name: format!("Player Number {i}"),
            team: TEAMS[i % TEAMS.len()].to_string(),
            position: "Midfielder".to_string(),
            is_captain: i % 3 == 0,
            age: 18 + (i % 22) as u32,
            minutes_played: ((i * 37) % 3000) as u32,
            passing_accuracy: (i % 100) as f32,
            image_url: String::new(),
        })
        .collect()
}

fn sample_json(n: usize) -> String {
    let rows: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"id":"{i}","playerName":"Player {i}","teamName":"{team}","isCaptain":{cap},"age":{age},"minutesPlayed":"{min}","passingAccuracy":{acc},"image":"","position":"MF"}}"#,
                team = TEAMS[i % TEAMS.len()],
                cap = i % 3 == 0,
                age = 18 + (i % 22),
                min = (i * 37) % 3000,
                acc = i % 100,
            )
        })
        .collect();
    format!("[{}]", rows.join(","))
}

fn bench_players_parse(c: &mut Criterion) {
    let raw = sample_json(500);
    c.bench_function("players_parse", |b| {
        b.iter(|| {
            let players = parse_players_json(black_box(&raw)).unwrap();
            black_box(players.len());
        })
    });
}

fn bench_captains_view(c: &mut Criterion) {
    let players = sample_players(2_000);
    c.bench_function("captains_view", |b| {
        b.iter(|| {
            let rows = captains_view(black_box(&players));
            black_box(rows.len());
        })
    });
}

fn bench_browse_rows(c: &mut Criterion) {
    let players = sample_players(2_000);
    let favorites: FavoriteSet = (0..2_000).step_by(7).map(|i: usize| i.to_string()).collect();
    let query = ViewQuery::new(Screen::Browse)
        .with_team(TeamFilter::parse("Chelsea"))
        .with_search("number 1");
    c.bench_function("browse_rows", |b| {
        b.iter(|| {
            let rows = derive_rows(black_box(&players), &favorites, &query);
            black_box(rows.len());
        })
    });
}

criterion_group!(
    benches,
    bench_players_parse,
    bench_captains_view,
    bench_browse_rows
);
criterion_main!(benches);
