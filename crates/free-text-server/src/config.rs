use agent_utils::AppConfig;

/// Free-text function server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Documents kept after similarity ranking
    pub k: usize,
    /// Token ceiling for the documents sent to the model
    pub max_input_tokens: usize,
    /// Model answering the questions
    pub engine: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            k: 5,
            max_input_tokens: 3800,
            engine: "gpt-4o-mini".to_string(),
        }
    }
}

impl ServerConfig {
    /// Listen where the agent expects the server to be
    pub fn from_app_config(app: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: app
                .free_text_server
                .host_str()
                .map_or(defaults.host, ToString::to_string),
            port: app
                .free_text_server
                .port_or_known_default()
                .unwrap_or(defaults.port),
            engine: app.free_text_model.clone(),
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
