#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub log_level: String,
    pub sub_radius: f64,
    pub min_sub_radius: f64,
    pub max_workers: usize,
    pub adaptive_sub_radius: bool,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub page_delay_ms: u64,
    pub next_page_delay_ms: u64,
    pub detail_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("api_base_url", &self.api_base_url)
            .field("log_level", &self.log_level)
            .field("sub_radius", &self.sub_radius)
            .field("min_sub_radius", &self.min_sub_radius)
            .field("max_workers", &self.max_workers)
            .field("adaptive_sub_radius", &self.adaptive_sub_radius)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("next_page_delay_ms", &self.next_page_delay_ms)
            .field("detail_delay_ms", &self.detail_delay_ms)
            .finish()
    }
}
