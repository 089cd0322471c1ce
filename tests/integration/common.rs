use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sumi_quill::config::{parse_config, Config};
use sumi_quill::extractor::Sleeper;
use sumi_quill::{ExtractionPipeline, HtmlArticleParser};
use sumi_quill::fetch::DirectFetcher;

pub const ARTICLE_HTML: &str = r#"<html><head>
<title>Example News | Markets rally</title>
<meta property="og:title" content="Markets rally on rate hopes">
<meta property="article:published_time" content="2024-06-03T07:30:00+02:00">
<script type="application/ld+json">
{"@type": "NewsArticle", "author": [{"@type": "Person", "name": "Jane Doe"}]}
</script>
</head><body>
<nav><p>Home</p></nav>
<article>
<span class="byline">By Jane Doe and John Roe</span>
<p>Stocks climbed on Monday.</p>
<p>Analysts expect further gains.</p>
</article>
</body></html>"#;

/// Skips every pause so retry tests run instantly
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Creates a test configuration with the given retry budget and proxies
pub fn create_test_config(max_retries: u32, proxies: &[String]) -> Config {
    let proxy_list = proxies
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");

    let toml = format!(
        r#"
[pipeline]
max-retries = {}

[batch]
delay-seconds = 0.0

[fetch]
timeout-secs = 5

[identity]
user-agents = ["QuillTest/1.0"]
use-proxy = {}
proxies = [{}]
accept-language = "fr-FR"
"#,
        max_retries,
        !proxies.is_empty(),
        proxy_list
    );

    parse_config(&toml).expect("Failed to parse test config")
}

/// Creates a pipeline with the direct fetcher and no backoff pauses
pub fn create_test_pipeline(config: &Config) -> ExtractionPipeline {
    ExtractionPipeline::new(
        config,
        Arc::new(DirectFetcher::new(config.fetch.timeout())),
        Arc::new(HtmlArticleParser::new()),
    )
    .with_sleeper(Arc::new(NoopSleeper))
}
