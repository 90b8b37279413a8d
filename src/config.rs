use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, sourced from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_host: String,
    pub code_model: String,
    pub vision_model: String,
    pub max_pages: usize,
    pub max_description_length: usize,
    pub max_images: usize,
    pub max_image_size_mb: usize,
    pub request_timeout: Duration,
    pub rate_limit_per_minute: u32,
    /// Static credential set; empty disables API key checks.
    pub api_keys: HashSet<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_host: "http://ollama:11434".to_string(),
            code_model: "qwen2.5-coder:7b".to_string(),
            vision_model: "llama3.2-vision".to_string(),
            max_pages: 5,
            max_description_length: 2000,
            max_images: 3,
            max_image_size_mb: 5,
            request_timeout: Duration::from_secs(300),
            rate_limit_per_minute: 10,
            api_keys: HashSet::new(),
            port: 8080,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            ollama_host: env_or("OLLAMA_HOST", defaults.ollama_host),
            code_model: env_or("CODE_MODEL", defaults.code_model),
            vision_model: env_or("VISION_MODEL", defaults.vision_model),
            max_pages: env_or("MAX_PAGES", defaults.max_pages),
            max_description_length: env_or("MAX_DESCRIPTION_LENGTH", defaults.max_description_length),
            max_images: env_or("MAX_IMAGES", defaults.max_images),
            max_image_size_mb: env_or("MAX_IMAGE_SIZE_MB", defaults.max_image_size_mb),
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT", 300)),
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute),
            api_keys: std::env::var("API_KEYS")
                .map(|keys| {
                    keys.split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            port: env_or("PORT", defaults.port),
        }
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.max_image_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.ollama_host, "http://ollama:11434");
        assert_eq!(config.code_model, "qwen2.5-coder:7b");
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.max_description_length, 2000);
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn image_size_cap_is_in_bytes() {
        let config = Config::default();
        assert_eq!(config.max_image_size_bytes(), 5 * 1024 * 1024);
    }
}
