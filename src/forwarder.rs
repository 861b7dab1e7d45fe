//! Builds the `<UserFeedback>` XML document and POSTs it to the support
//! endpoint.

use anyhow::{Context, Result};
use tracing::debug;

use crate::command::FeedbackKind;
use crate::config::FeedbackConfig;

const PRODUCTION_HOST: &str = "https://www.ventuz.com";
pub const TEST_HOST: &str = "http://127.0.0.1:9871";
const ENDPOINT_PATH: &str = "/support/ventuzfeedback.php";

/// One eligible event, ready to be submitted.
#[derive(Debug, Clone)]
pub struct FeedbackReport {
    pub kind: FeedbackKind,
    pub payload: String,
    /// Channel name, reported as the CATEGORY line of the body.
    pub channel_label: String,
    /// Author name; the endpoint sees `{user_tag}@discord` as the email.
    pub user_tag: String,
    pub version: String,
}

/// Replaces the five XML-special characters with their named entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl FeedbackReport {
    /// Renders the XML body sent to the endpoint. Lines are CRLF-joined
    /// to match what the support tooling expects.
    pub fn to_xml(&self) -> String {
        format!(
            "<UserFeedback email=\"{email}\" version=\"{version}\" type=\"{letter}\">\r\n\
             CATEGORY: {channel}\r\n\
             {payload}\r\n\
             </UserFeedback>",
            email = escape_html(&format!("{}@discord", self.user_tag)),
            version = escape_html(&self.version),
            letter = self.kind.type_letter(),
            channel = escape_html(&self.channel_label),
            payload = escape_html(&self.payload),
        )
    }

    /// Human-readable subject header, e.g. `BUG in Ventuz X (from Discord)`.
    pub fn subject(&self) -> String {
        format!(
            "{} in {} (from Discord)",
            self.kind.as_str().to_uppercase(),
            self.version
        )
    }
}

pub struct FeedbackClient {
    client: reqwest::Client,
    base_url: String,
}

impl FeedbackClient {
    pub fn new(config: &FeedbackConfig, test_mode: bool) -> Self {
        let base_url = config.host.clone().unwrap_or_else(|| {
            if test_mode {
                TEST_HOST.to_string()
            } else {
                PRODUCTION_HOST.to_string()
            }
        });
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Submits one report. Success is exactly "request completed with
    /// status 200"; anything else is an error for the caller to log. No
    /// retry.
    pub async fn submit(&self, report: &FeedbackReport) -> Result<()> {
        let body = report.to_xml();
        let url = format!("{}{}", self.base_url, ENDPOINT_PATH);

        debug!("Submitting {} feedback to {}", report.kind.as_str(), url);

        let response = self
            .client
            .post(&url)
            .header("ver", &report.version)
            .header("subject", report.subject())
            .header(reqwest::header::CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .context("Failed to send feedback request")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Feedback endpoint returned {}: {}", status, error_body);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(kind: FeedbackKind, payload: &str) -> FeedbackReport {
        FeedbackReport {
            kind,
            payload: payload.to_string(),
            channel_label: "bugs".to_string(),
            user_tag: "alice".to_string(),
            version: "Ventuz X".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"a < b && c > "d" 'e'"#),
            "a &lt; b &amp;&amp; c &gt; &quot;d&quot; &apos;e&apos;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_bug_body_layout() {
        let xml = report(FeedbackKind::Bug, "The export crashes").to_xml();
        assert_eq!(
            xml,
            "<UserFeedback email=\"alice@discord\" version=\"Ventuz X\" type=\"B\">\r\n\
             CATEGORY: bugs\r\n\
             The export crashes\r\n\
             </UserFeedback>"
        );
    }

    #[test]
    fn test_non_bug_kinds_use_f() {
        for kind in [FeedbackKind::Request, FeedbackKind::Idea, FeedbackKind::Feedback] {
            let xml = report(kind, "x").to_xml();
            assert!(xml.contains("type=\"F\""), "{xml}");
        }
    }

    #[test]
    fn test_payload_is_escaped() {
        let xml = report(FeedbackKind::Idea, "use <b>bold</b> & \"quotes\"").to_xml();
        assert!(xml.contains("use &lt;b&gt;bold&lt;/b&gt; &amp; &quot;quotes&quot;"));
        // The only raw angle brackets left belong to the root element.
        let inner = xml
            .trim_start_matches("<UserFeedback")
            .trim_end_matches("</UserFeedback>");
        let inner = &inner[inner.find('>').unwrap() + 1..];
        assert!(!inner.contains('<') && !inner.contains('>'));
    }

    #[test]
    fn test_subject_header() {
        assert_eq!(
            report(FeedbackKind::Bug, "x").subject(),
            "BUG in Ventuz X (from Discord)"
        );
        assert_eq!(
            report(FeedbackKind::Idea, "x").subject(),
            "IDEA in Ventuz X (from Discord)"
        );
    }

    #[tokio::test]
    async fn test_submit_requires_status_200() {
        use axum::routing::post;
        use axum::Router;

        async fn serve(app: Router) -> String {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
                .await
                .unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{}", addr)
        }

        let ok_host = serve(Router::new().route(
            "/support/ventuzfeedback.php",
            post(|| async { "post received" }),
        ))
        .await;
        // No route registered: every request gets a 404.
        let missing_host = serve(Router::new()).await;

        let client = FeedbackClient {
            client: reqwest::Client::new(),
            base_url: ok_host,
        };
        assert!(client.submit(&report(FeedbackKind::Bug, "x")).await.is_ok());

        let client = FeedbackClient {
            client: reqwest::Client::new(),
            base_url: missing_host,
        };
        assert!(client.submit(&report(FeedbackKind::Bug, "x")).await.is_err());
    }

    #[test]
    fn test_host_selection() {
        let config = FeedbackConfig {
            version: "Ventuz X".to_string(),
            host: None,
            submitted_log: "submitted.json".into(),
        };
        assert_eq!(FeedbackClient::new(&config, true).base_url, TEST_HOST);
        assert_eq!(FeedbackClient::new(&config, false).base_url, PRODUCTION_HOST);

        let overridden = FeedbackConfig {
            host: Some("http://example.test".to_string()),
            ..config
        };
        assert_eq!(
            FeedbackClient::new(&overridden, false).base_url,
            "http://example.test"
        );
    }
}
