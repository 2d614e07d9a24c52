use anyhow::Result;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, FetchError};
use crate::http_client::http_client;
use crate::state::Player;

const MAX_ERROR_BODY: usize = 200;

/// Where the canonical list comes from.
pub trait CatalogSource: Send {
    /// The full list in one call.
    fn fetch_all(&self) -> Result<Vec<Player>, FetchError>;

    /// A single player; a missing id is `CatalogError::NotFound`.
    fn fetch_player(&self, id: &str) -> Result<Player, CatalogError>;
}

/// Read-only REST collection: `GET {base}` for the list, `GET {base}/{id}` for one record.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: &'static Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = http_client(config.http_timeout)?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "catalog request");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| FetchError::Transport(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }
        Ok(body)
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch_all(&self) -> Result<Vec<Player>, FetchError> {
        let body = self.get(&self.base_url)?;
        parse_players_json(&body)
    }

    fn fetch_player(&self, id: &str) -> Result<Player, CatalogError> {
        let id = id.trim();
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(CatalogError::not_found(id));
        }
        let url = format!("{}/{id}", self.base_url);
        let body = match self.get(&url) {
            Ok(body) => body,
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(CatalogError::not_found(id));
            }
            Err(err) => return Err(err.into()),
        };
        parse_player_json(&body)?.ok_or_else(|| CatalogError::not_found(id))
    }
}

/// A JSON array of player records. Blank and `null` bodies are an empty list; records
/// without an id are skipped.
pub fn parse_players_json(raw: &str) -> Result<Vec<Player>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let records: Vec<PlayerRecord> =
        serde_json::from_str(trimmed).map_err(|err| FetchError::Parse(err.to_string()))?;
    Ok(records.into_iter().filter_map(PlayerRecord::into_player).collect())
}

/// One player record, `None` for a blank/`null` body or a record without an id.
pub fn parse_player_json(raw: &str) -> Result<Option<Player>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let record: PlayerRecord =
        serde_json::from_str(trimmed).map_err(|err| FetchError::Parse(err.to_string()))?;
    Ok(record.into_player())
}

#[derive(Debug, Deserialize)]
struct PlayerRecord {
    #[serde(default, deserialize_with = "string_or_default")]
    id: String,
    #[serde(rename = "playerName", default, deserialize_with = "string_or_default")]
    player_name: String,
    #[serde(rename = "teamName", default, deserialize_with = "string_or_default")]
    team_name: String,
    #[serde(default, deserialize_with = "string_or_default")]
    position: String,
    #[serde(rename = "isCaptain", default, deserialize_with = "bool_or_default")]
    is_captain: bool,
    #[serde(default, deserialize_with = "float_or_none")]
    age: Option<f64>,
    #[serde(rename = "minutesPlayed", default, deserialize_with = "float_or_none")]
    minutes_played: Option<f64>,
    #[serde(rename = "passingAccuracy", default, deserialize_with = "float_or_none")]
    passing_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "string_or_default")]
    image: String,
}

impl PlayerRecord {
    fn into_player(self) -> Option<Player> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return None;
        }
        Some(Player {
            id,
            name: self.player_name.trim().to_string(),
            team: self.team_name.trim().to_string(),
            position: self.position.trim().to_string(),
            is_captain: self.is_captain,
            age: non_negative_u32(self.age),
            minutes_played: non_negative_u32(self.minutes_played),
            passing_accuracy: self
                .passing_accuracy
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, 100.0) as f32)
                .unwrap_or(0.0),
            image_url: self.image,
        })
    }
}

fn non_negative_u32(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let rendered = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(rendered)
}

fn bool_or_default<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let flag = match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        _ => false,
    };
    Ok(flag)
}

fn float_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) => Ok(s.trim().trim_end_matches('%').parse::<f64>().ok()),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_as_strings_and_out_of_range_values_are_normalised() {
        let raw = r#"{"id": 12, "playerName": " Jordan Henderson ", "teamName": "Liverpool",
            "isCaptain": "true", "age": "35", "minutesPlayed": -20,
            "passingAccuracy": "104.5%", "image": "https://img/12.png", "position": "CM"}"#;
        let player = parse_player_json(raw).expect("parse").expect("record");
        assert_eq!(player.id, "12");
        assert_eq!(player.name, "Jordan Henderson");
        assert!(player.is_captain);
        assert_eq!(player.age, 35);
        assert_eq!(player.minutes_played, 0);
        assert_eq!(player.passing_accuracy, 100.0);
    }

    #[test]
    fn record_without_id_is_skipped() {
        let players =
            parse_players_json(r#"[{"playerName": "Ghost"}, {"id": "1", "playerName": "Real"}]"#)
                .expect("parse");
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Real");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé...");
        assert_eq!(truncate(" short ", 10), "short");
    }
}
