// ===============================
// src/gateway.rs
// ===============================
//
// TreasuryDirect SBCPrice gateway (REST, form POST).
// Satu request per bond, tanpa retry: kegagalan langsung dikembalikan ke caller.
//
use std::time::Instant;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::config::Settings;
use crate::error::ValuationError;
use crate::metrics::SBC_LATENCY;

pub const SBC_PRICE_PATH: &str = "/BC/SBCPrice";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Sends an encoded form body to the calculator and returns the raw HTML.
pub trait Transport {
    async fn submit(&self, body: String) -> Result<String, ValuationError>;
}

pub struct HttpGateway {
    http: reqwest::Client,
    endpoint: Url,
    user_agent: String,
}

impl HttpGateway {
    pub fn new(settings: &Settings) -> Result<Self, ValuationError> {
        let endpoint = settings
            .base_url
            .join(SBC_PRICE_PATH)
            .map_err(|e| ValuationError::Transport {
                status: None,
                message: format!("bad endpoint: {e}"),
            })?;
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| ValuationError::Transport {
                status: None,
                message: format!("http client init: {e}"),
            })?;
        Ok(Self {
            http,
            endpoint,
            user_agent: settings.user_agent.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpGateway {
    async fn submit(&self, body: String) -> Result<String, ValuationError> {
        let started = Instant::now();
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .header(CACHE_CONTROL, "no-cache")
            .header(USER_AGENT, &self.user_agent)
            .body(body)
            .send()
            .await;
        SBC_LATENCY.observe(started.elapsed().as_secs_f64());

        match resp {
            Ok(rsp) if rsp.status().is_success() => rsp.text().await.map_err(|e| {
                tracing::error!(?e, "SBCPrice body read failed");
                ValuationError::Transport {
                    status: None,
                    message: format!("reading response body: {e}"),
                }
            }),
            Ok(rsp) => {
                let code = rsp.status();
                let body = rsp.text().await.unwrap_or_default();
                tracing::error!(%code, %body, "SBCPrice POST failed");
                Err(ValuationError::Transport {
                    status: Some(code.as_u16()),
                    message: format!("SBCPrice returned HTTP {code}"),
                })
            }
            Err(e) => {
                tracing::error!(?e, "SBCPrice POST err");
                Err(ValuationError::Transport {
                    status: e.status().map(|s| s.as_u16()),
                    message: format!("SBCPrice request failed: {e}"),
                })
            }
        }
    }
}
