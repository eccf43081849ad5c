use cataas_bot::bot::runner::run_bot;
use cataas_bot::cataas::{CatClient, CatUrls, HttpCatApi};
use cataas_bot::config::Settings;
use cataas_bot::tags::TagCache;
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting the bot token from logs
struct RedactionPatterns {
    url_token: Regex,
    bare_token: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            url_token: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)")?,
            bare_token: Regex::new(r"\b[0-9]{8,10}:[A-Za-z0-9_-]{35}\b")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let output = self.url_token.replace_all(input, "$1[TELEGRAM_TOKEN]");
        self.bare_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .into_owned()
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length, the caller wrote all of it
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Before logging, so the very first lines are already redacted
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting cataas bot...");

    let settings = init_settings();

    // A missing tag file only disables suggestions
    let tag_cache = Arc::new(TagCache::load(&settings.tags_file));

    let cat_client = Arc::new(CatClient::new(
        Box::new(HttpCatApi::new()),
        CatUrls::new(settings.cataas_base_url.clone()),
        settings.retry_policy(),
    ));
    info!("Cat API client initialized for {}.", settings.cataas_base_url);

    run_bot(settings, tag_cache, cat_client).await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Set TELEGRAM_TOKEN in the environment or in a .env file.");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_token_in_api_url() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let line = "error sending request for url (https://api.telegram.org/bot123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw/SendPhoto)";
        let redacted = patterns.redact(line);
        assert!(!redacted.contains("AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"));
        assert!(redacted.contains("https://api.telegram.org/bot[TELEGRAM_TOKEN]/SendPhoto"));
        Ok(())
    }

    #[test]
    fn test_redacts_bare_token() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let redacted = patterns.redact("token=123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsawX rest");
        assert_eq!(redacted, "token=[TELEGRAM_TOKEN] rest");
        Ok(())
    }

    #[test]
    fn test_leaves_plain_text_alone() -> Result<(), regex::Error> {
        let patterns = RedactionPatterns::new()?;
        let line = "Fetch of https://cataas.com/cat gave up after 3 attempt(s): 500";
        assert_eq!(patterns.redact(line), line);
        Ok(())
    }
}
