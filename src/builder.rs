use crate::{
    Result,
    client::ApiClient,
    config::{ApiAuth, Config},
    stream::StreamClient,
};

/// Assembles the backend clients from a [`Config`] plus overrides.
pub struct ClientBuilder {
    config: Config,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration, e.g. one from [`Config::create`].
    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(
        mut self,
        url: impl Into<String>,
    ) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn timeout_ms(
        mut self,
        ms: u64,
    ) -> Self {
        self.config.api.timeout_ms = ms;
        self
    }

    pub fn auth(
        mut self,
        auth: ApiAuth,
    ) -> Self {
        self.config.api.auth = auth;
        self
    }

    pub fn stream_url(
        mut self,
        url: impl Into<String>,
    ) -> Self {
        self.config.stream.url = url.into();
        self
    }

    pub fn max_reconnect_attempts(
        mut self,
        attempts: u32,
    ) -> Self {
        self.config.stream.max_reconnect_attempts = attempts;
        self
    }

    pub fn reconnect_backoff_ms(
        mut self,
        ms: u64,
    ) -> Self {
        self.config.stream.reconnect_backoff_ms = ms;
        self
    }

    /// Build the HTTP client for the workflow backend.
    pub fn build(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config.api)
    }

    /// Build a stream client for one agent's chat channel.
    pub fn chat_stream(
        &self,
        agent_id: &str,
    ) -> StreamClient {
        StreamClient::chat(&self.config.stream, agent_id)
    }

    /// Build a stream client for the admin metrics channel.
    pub fn admin_stream(&self) -> StreamClient {
        StreamClient::admin(&self.config.stream)
    }
}
