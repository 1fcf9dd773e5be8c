//! # 📡 THE ROUTE MANAGER BACKEND
//!
//! *Previously, on rmx...*
//!
//! 🎬 COLD OPEN — INT. CHANGE WINDOW — 6:02 AM
//!
//! One GET to fetch every route. One PUT per route to put it back.
//! Basic auth on both. Anything but a 2xx and that call is over: no retries,
//! no backoff, no heroics. The backup on disk is the safety net, not a retry loop.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::backends::{RouteSink, RouteSource};
use crate::common::Route;
use crate::credentials::Credentials;

/// 📡 How to reach the route manager. Credentials resolve through [`Credentials::resolve`].
#[derive(Debug, Deserialize, Clone)]
pub struct RouteManagerConfig {
    /// Base of the router API, without the trailing `/routes`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    /// 🔒 If this is in plaintext in a committed config file, please reconsider your choices.
    #[serde(default)]
    pub password: Option<String>,
    /// 🔒 Properties file with `emxaccount<env>.username` / `.password`. `~/` is expanded.
    #[serde(default)]
    pub credentials_file: Option<std::path::PathBuf>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://emx-route-manager-dev.churchofjesuschrist.org/api/emx-router".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RouteManagerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            credentials_file: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// 📡 A thin, authenticated client for the two calls we need.
#[derive(Debug, Clone)]
pub struct RouteManagerClient {
    // 📡 reused across requests. one connection pool, many routes.
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl RouteManagerClient {
    pub fn new(config: &RouteManagerConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("💀 The HTTP client refused to be born. Probably TLS. It's always TLS.")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 📥 `GET /routes` — the whole routes document, as text, untouched.
    pub async fn fetch_routes(&self) -> Result<String> {
        let url = format!("{}/routes", self.base_url);
        debug!("📡 GET {}", url);
        let request = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password));
        self.send(request, "GET", &url).await
    }

    /// 📤 `PUT /updateroute` — one route, www-form encoded.
    pub async fn update_route(&self, route: &Route) -> Result<String> {
        let url = format!("{}/updateroute", self.base_url);
        debug!("📡 PUT {} for route '{}' ({})", url, route.name, route.uuid);
        let request = self
            .client
            .put(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(route.form_body());
        self.send(request, "PUT", &url)
            .await
            .context(format!("💀 Updating route '{}' ({}) failed", route.name, route.uuid))
    }

    // -- 📬 send, read the body, and treat anything but 2xx as the end of this call
    async fn send(&self, request: reqwest::RequestBuilder, verb: &str, url: &str) -> Result<String> {
        let response = request
            .send()
            .await
            .context(format!("💀 {verb} {url} never made it. error sending request."))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context(format!("💀 {verb} {url} answered {status} but the body got lost in transit"))?;
        trace!("📬 {} {} → {} ({} bytes)", verb, url, status, body.len());
        if !status.is_success() {
            bail!("💀 {verb} {url} answered {status}. Body: {body}");
        }
        Ok(body)
    }
}

/// 🚰 The live route collection.
#[derive(Debug)]
pub struct RouteManagerSource {
    client: RouteManagerClient,
}

impl RouteManagerSource {
    pub fn new(client: RouteManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouteSource for RouteManagerSource {
    async fn load_document(&mut self) -> Result<String> {
        self.client.fetch_routes().await
    }

    fn describe(&self) -> String {
        format!("route manager {}", self.client.base_url())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// 🕳️ One update call per route. Nothing buffered, so `close` has nothing to do.
#[derive(Debug)]
pub struct RouteManagerSink {
    client: RouteManagerClient,
}

impl RouteManagerSink {
    pub fn new(client: RouteManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouteSink for RouteManagerSink {
    async fn submit(&self, route: &Route) -> Result<()> {
        self.client.update_route(route).await.map(|_| ())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("route manager {}", self.client.base_url())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn the_client(server: &MockServer) -> Result<RouteManagerClient> {
        let the_config = RouteManagerConfig {
            base_url: format!("{}/api/emx-router/", server.uri()),
            ..RouteManagerConfig::default()
        };
        RouteManagerClient::new(
            &the_config,
            Credentials { username: "svc".to_string(), password: "pw".to_string() },
        )
    }

    fn the_route() -> Route {
        Route {
            uuid: "32354541274".to_string(),
            name: "Elend".to_string(),
            rule: r#"endpoint.system=="cars""#.to_string(),
            description: "vendor feed".to_string(),
            enabled: false,
            queues: vec!["scms#stage".to_string(), "cfis#dev%3Askim".to_string()],
            created_date: "2023-03-28".to_string(),
            modified_date: "2023-03-28".to_string(),
        }
    }

    #[tokio::test]
    async fn the_one_where_the_routes_document_comes_home_untouched() -> Result<()> {
        let the_server = MockServer::start().await;
        let the_document = r#"{"routesList":[]}"#;
        Mock::given(method("GET"))
            .and(path("/api/emx-router/routes"))
            .and(basic_auth("svc", "pw"))
            .respond_with(ResponseTemplate::new(200).set_body_string(the_document))
            .expect(1)
            .mount(&the_server)
            .await;

        let mut the_source = RouteManagerSource::new(the_client(&the_server)?);
        assert_eq!(the_source.load_document().await?, the_document);
        assert!(the_source.is_remote());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_500_is_fatal_and_says_why() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/emx-router/routes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("router on fire"))
            .mount(&the_server)
            .await;

        let the_error = the_client(&the_server)?.fetch_routes().await.expect_err("500 is fatal");
        let the_message = the_error.to_string();
        assert!(the_message.contains("500"), "{the_message}");
        assert!(the_message.contains("router on fire"), "{the_message}");
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_update_is_a_form_encoded_put() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/emx-router/updateroute"))
            .and(basic_auth("svc", "pw"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "name=Elend&rule=endpoint.system%3D%3D%22cars%22&description=vendor+feed\
                 &queues=scms%23stage%2Ccfis%23dev%253Askim&enabled=false&uuid=32354541274",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&the_server)
            .await;

        let the_sink = RouteManagerSink::new(the_client(&the_server)?);
        the_sink.submit(&the_route()).await?;
        the_sink.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_rejected_update_names_the_route() -> Result<()> {
        let the_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
            .mount(&the_server)
            .await;

        let the_error = RouteManagerSink::new(the_client(&the_server)?)
            .submit(&the_route())
            .await
            .expect_err("403 is fatal");
        let the_chain = format!("{the_error:#}");
        assert!(the_chain.contains("Elend"), "{the_chain}");
        assert!(the_chain.contains("403"), "{the_chain}");
        Ok(())
    }
}
