//! Newsletter generator
//!
//! Pulls the tracked biotech/VC feeds, summarizes each item with the
//! chat model, and assembles the weekly HTML newsletter. A source that
//! fails to fetch or summarize is skipped and reported, never fatal to
//! the whole run. Item summaries are produced sequentially; the volume
//! (a handful of items per feed) does not justify fan-out.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::email::Mailer;
use crate::errors::AppError;
use crate::feeds::{self, FeedItem};
use crate::llm::ChatModel;

/// Tracked feeds, in newsletter section order.
const SOURCES: &[(&str, &str)] = &[
    ("fiercebiotech", "https://www.fiercebiotech.com/rss/xml"),
    ("techcrunch", "https://techcrunch.com/category/biotech/feed/"),
    ("stat", "https://www.statnews.com/feed"),
];

const FEED_TIMEOUT_SECS: u64 = 30;

const EMAIL_SUBJECT: &str = "Weekly Biotech & VC Newsletter";

#[derive(Debug, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct Section {
    pub source: String,
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
pub struct Newsletter {
    pub date: String,
    pub sections: Vec<Section>,
    /// Sources that failed to fetch or summarize this run.
    pub skipped_sources: Vec<String>,
}

pub struct NewsletterService {
    model: Arc<dyn ChatModel>,
    mailer: Option<Arc<Mailer>>,
    http: reqwest::Client,
}

impl NewsletterService {
    pub fn new(model: Arc<dyn ChatModel>, mailer: Option<Arc<Mailer>>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::FetchFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { model, mailer, http })
    }

    /// Build this week's newsletter content from the tracked feeds.
    pub async fn generate(&self) -> Result<Newsletter, AppError> {
        let mut sections = Vec::with_capacity(SOURCES.len());
        let mut skipped_sources = Vec::new();

        for (source, url) in SOURCES {
            match self.build_section(source, url).await {
                Ok(section) => sections.push(section),
                Err(e) => {
                    tracing::warn!(source, error = %e, "Skipping newsletter source");
                    skipped_sources.push(source.to_string());
                }
            }
        }

        metrics::counter!("paperbrief_newsletter_runs_total").increment(1);

        Ok(Newsletter {
            date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            sections,
            skipped_sources,
        })
    }

    async fn build_section(&self, source: &str, url: &str) -> Result<Section, AppError> {
        let items = feeds::fetch_feed(&self.http, url).await?;
        let items = self.summarize_items(items).await?;
        Ok(Section {
            source: source.to_string(),
            items,
        })
    }

    /// Summarize each item's description into 2-3 sentences.
    async fn summarize_items(&self, items: Vec<FeedItem>) -> Result<Vec<NewsItem>, AppError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let prompt = format!(
                "Summarize this biotech/VC news in 2-3 sentences: {}",
                item.description
            );
            let summary = self.model.complete_text(&prompt).await?;
            out.push(NewsItem {
                title: item.title,
                summary,
                link: item.link,
            });
        }
        Ok(out)
    }

    /// Generate, render and deliver the newsletter to one recipient.
    pub async fn send(&self, recipient: &str) -> Result<(), AppError> {
        let Some(mailer) = self.mailer.as_ref() else {
            return Err(AppError::EmailNotConfigured);
        };

        let newsletter = self.generate().await?;
        let html = render_html(&newsletter);
        mailer.send_html(recipient, EMAIL_SUBJECT, &html).await
    }
}

/// Render the newsletter into the email-ready HTML document.
pub fn render_html(newsletter: &Newsletter) -> String {
    let mut body = String::new();
    for section in &newsletter.sections {
        body.push_str(&format!("<h3>{}</h3>\n<ul>\n", section.source));
        for item in &section.items {
            body.push_str(&format!(
                "<li><a href='{}' target='_blank'>{}</a>: {}</li>\n",
                item.link, item.title, item.summary
            ));
        }
        body.push_str("</ul>\n");
    }

    format!(
        "<html>\n<body>\n\
         <h2>Weekly Biotech &amp; VC Insights</h2>\n\
         <p>{}</p>\n\
         {body}\
         <p>Stay ahead in biotech and venture capital!</p>\n\
         </body>\n</html>",
        newsletter.date
    )
}
