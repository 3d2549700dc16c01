//! Ollama auto-discovery helpers.
//!
//! Pings the configured model server's `/api/tags` endpoint and, when it is
//! responsive, returns the list of locally downloaded models so the CLI can
//! report whether the oracle has a backend to talk to.

use serde::Deserialize;

/// A single model entry returned by Ollama's `/api/tags` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

/// Raw shape of the `/api/tags` JSON response.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<OllamaModel>,
}

fn tags_url(base_url: &str) -> String {
    format!("{}/api/tags", base_url.trim_end_matches('/'))
}

/// Ping the Ollama server and return the list of available models.
///
/// Returns `Ok(models)` when the server is running and reachable, or
/// `Err(reason)` when it is not (server offline, network error, etc.).
pub fn fetch_models(base_url: &str) -> Result<Vec<OllamaModel>, String> {
    let url = tags_url(base_url);
    let response = reqwest::blocking::get(&url)
        .map_err(|e| format!("Ollama unreachable at {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(format!("Ollama returned HTTP {}", response.status()));
    }

    let tags: TagsResponse = response
        .json()
        .map_err(|e| format!("Failed to parse Ollama response: {}", e))?;

    Ok(tags.models)
}

/// Returns `true` if the Ollama server is reachable.
pub fn is_running(base_url: &str) -> bool {
    fetch_models(base_url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_url_strips_trailing_slash() {
        assert_eq!(
            tags_url("http://localhost:11434/"),
            "http://localhost:11434/api/tags"
        );
        assert_eq!(
            tags_url("http://localhost:11434"),
            "http://localhost:11434/api/tags"
        );
    }

    #[test]
    fn tags_response_parses() {
        let raw = r#"{"models": [{"name": "llama3"}, {"name": "mistral"}]}"#;
        let tags: TagsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(tags.models.len(), 2);
        assert_eq!(tags.models[0].name, "llama3");
    }
}
