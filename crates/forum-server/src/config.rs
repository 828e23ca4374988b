use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub media_dir: PathBuf,
    /// Overrides the built-in moderation list when set.
    pub banned_words: Option<Vec<String>>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("FORUM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("FORUM_JWT_SECRET is unset or still a placeholder; it must match the token issuer's secret");
        }

        let db_path = std::env::var("FORUM_DB_PATH").unwrap_or_else(|_| "forum.db".into()).into();
        let host = std::env::var("FORUM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("FORUM_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .context("FORUM_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;
        let media_dir = std::env::var("FORUM_MEDIA_DIR").unwrap_or_else(|_| "media".into()).into();

        let banned_words = std::env::var("FORUM_BANNED_WORDS")
            .ok()
            .map(|v| parse_word_list(&v))
            .filter(|words| !words.is_empty());

        let max_upload_mb: usize = std::env::var("FORUM_MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .context("FORUM_MAX_UPLOAD_MB must be a whole number")?;

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            media_dir,
            banned_words,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_list_ignores_blanks() {
        assert_eq!(parse_word_list(" spam, ,eggs,"), vec!["spam", "eggs"]);
        assert!(parse_word_list(" , ").is_empty());
    }
}
