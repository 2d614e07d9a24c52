use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://672263622108960b9cc43af6.mockapi.io/players";
pub const DEFAULT_FAVORITES_KEY: &str = "favorites";
pub const DEFAULT_TEAMS: &[&str] = &[
    "Manchester City",
    "Liverpool",
    "Chelsea",
    "Manchester United",
    "Arsenal",
    "Tottenham Hotspur",
];

const DATA_DIR: &str = "player_catalog";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_url: String,
    pub http_timeout: Duration,
    /// `None` when neither `CATALOG_DATA_DIR` nor a home directory is available.
    pub data_dir: Option<PathBuf>,
    pub favorites_key: String,
    pub teams: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
            favorites_key: DEFAULT_FAVORITES_KEY.to_string(),
            teams: DEFAULT_TEAMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl CatalogConfig {
    /// Loads `.env.local` and `.env` (if present) and then reads the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = env::var("CATALOG_API_URL")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.api_url);
        let http_timeout = Duration::from_secs(
            env::var("CATALOG_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .max(1),
        );
        let data_dir = env::var("CATALOG_DATA_DIR")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or(defaults.data_dir);
        let favorites_key = env::var("CATALOG_FAVORITES_KEY")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.favorites_key);
        let teams = parse_teams_env_or_default("CATALOG_TEAMS", DEFAULT_TEAMS);
        Self {
            api_url,
            http_timeout,
            data_dir,
            favorites_key,
            teams,
        }
    }
}

fn parse_teams_env_or_default(key: &str, default_teams: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => parse_teams(&raw),
        Err(_) => default_teams.iter().map(|t| t.to_string()).collect(),
    }
}

// Team names contain spaces, so only `,` and `;` separate entries.
fn parse_teams(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';']) {
        let name = part.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("all") {
            continue;
        }
        if !out.iter().any(|t| t == name) {
            out.push(name.to_string());
        }
    }
    out
}

fn default_data_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(DATA_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR),
    )
}
