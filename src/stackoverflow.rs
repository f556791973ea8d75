//! Stack Overflow lookup via the StackExchange search API.

use reqwest::Client;
use serde::Deserialize;

const API_URL: &str = "https://api.stackexchange.com/2.3/search/advanced";

/// Search Stack Overflow for an accepted-answer question matching `query`.
/// Returns a short "title + link" summary, or a "nothing found" message.
/// Network failures come back as a user-visible message, not an error: this
/// is a convenience lookup, never fatal to the session.
pub async fn search(client: &Client, query: &str) -> String {
    let result = client
        .get(API_URL)
        .query(&[
            ("order", "desc"),
            ("sort", "relevance"),
            ("q", query),
            ("site", "stackoverflow"),
            ("accepted", "True"),
            ("answers", "1"),
        ])
        .send()
        .await;

    let response = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Stack Overflow request failed: {}", e);
            return format!("Stack Overflow lookup failed: {}", e);
        }
    };

    let parsed: Result<SearchResponse, _> = response.json().await;
    match parsed {
        Ok(body) => match body.items.first() {
            Some(item) => format!(
                "Found this on Stack Overflow:\n{}\n{}",
                item.title, item.link
            ),
            None => "No answer found on Stack Overflow.".to_string(),
        },
        Err(e) => {
            tracing::warn!("Stack Overflow response parse failed: {}", e);
            format!("Stack Overflow lookup failed: {}", e)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    link: String,
}
