//! HTTP document source.
//!
//! Scoreboard: NBA live-data CDN JSON.
//! Spread board and team results: TeamRankings HTML, team pages addressed by slug.

use super::DocumentSource;
use crate::config::SourcesConfig;
use crate::engine::matcher::Team;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpSource {
    client: Client,
    scoreboard_url: String,
    spread_board_url: String,
    team_results_url: String,
    max_retries: u32,
}

impl HttpSource {
    pub fn new(config: &SourcesConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            scoreboard_url: config.scoreboard_url.clone(),
            spread_board_url: config.spread_board_url.clone(),
            team_results_url: config.team_results_url.clone(),
            max_retries: config.max_retries,
        })
    }

    fn results_url(&self, team: Team) -> String {
        self.team_results_url.replace("{slug}", team.slug())
    }

    fn classify(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }

    /// GET with linear backoff between attempts. Client errors (4xx) are not retried.
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
            }

            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        tracing::warn!(attempt, url, status = status.as_u16(), "HTTP error");
                        last_err = Some(FetchError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                        if status.is_client_error() {
                            break;
                        }
                        continue;
                    }
                    match resp.text().await {
                        Ok(body) => return Ok(body),
                        Err(e) => {
                            tracing::warn!(attempt, url, error = %e, "response read failed");
                            last_err = Some(Self::classify(url, e));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt, url, error = %e, "request failed");
                    last_err = Some(Self::classify(url, e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| FetchError::Transport {
            url: url.to_string(),
            message: "no attempts made".to_string(),
        }))
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn scoreboard(&self) -> Result<String, FetchError> {
        self.get_text(&self.scoreboard_url).await
    }

    async fn spread_board(&self) -> Result<String, FetchError> {
        self.get_text(&self.spread_board_url).await
    }

    async fn team_results(&self, team: Team) -> Result<String, FetchError> {
        self.get_text(&self.results_url(team)).await
    }
}
