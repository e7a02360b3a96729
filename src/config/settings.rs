/// Editor settings that can be customized via Rhai config
#[derive(Debug, Clone)]
pub struct Settings {
    // Display
    pub theme: String,
    pub toast_ms: u64,

    // Completion
    pub endpoint: String,
    pub completion_id: String,

    // Persistence
    pub debounce_ms: u64,
    pub saved_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "gruvbox-dark".to_string(),
            toast_ms: 3000,

            endpoint: "http://localhost:3000/api/generate".to_string(),
            completion_id: "quill".to_string(),

            debounce_ms: 750,
            saved_delay_ms: 500,
        }
    }
}

impl Settings {
    /// Apply overrides from the environment
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("QUILL_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint.trim().to_string();
            }
        }
    }
}
