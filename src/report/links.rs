//! Link classification.
//!
//! "Broken" here means the href is not a parseable absolute URL. Nothing is
//! fetched, so a well-formed link to a dead page still counts as valid.

use serde::Serialize;
use serde_json::Value;
use url::Url;

/// A hyperlink as reported by the `links` audit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkEntry {
    pub href: String,
    pub text: String,
    pub rel: String,
    pub target: String,
}

impl LinkEntry {
    /// Reads one audit item. Non-string fields are treated as empty.
    pub fn from_item(item: &Value) -> Option<Self> {
        let item = item.as_object()?;
        let field = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Some(Self {
            href: field("href"),
            text: field("text"),
            rel: field("rel"),
            target: field("target"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkBucket {
    Internal,
    External,
    Broken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLink {
    pub url: String,
    pub text: String,
    pub rel: String,
    pub target: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkDetails {
    pub internal: Vec<ClassifiedLink>,
    pub external: Vec<ClassifiedLink>,
    pub broken: Vec<ClassifiedLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatistics {
    pub total_links: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub broken_links: usize,
}

impl LinkDetails {
    pub fn statistics(&self) -> LinkStatistics {
        LinkStatistics {
            total_links: self.internal.len() + self.external.len() + self.broken.len(),
            internal_links: self.internal.len(),
            external_links: self.external.len(),
            broken_links: self.broken.len(),
        }
    }
}

/// Extracts link entries from the `links` audit; missing details mean no links.
pub fn link_entries(links_audit: Option<&Value>) -> Vec<LinkEntry> {
    links_audit
        .and_then(|audit| audit.get("details"))
        .and_then(|details| details.get("items"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(LinkEntry::from_item).collect())
        .unwrap_or_default()
}

pub fn classify_link(base: &Url, entry: &LinkEntry) -> (LinkBucket, ClassifiedLink) {
    let mut link = ClassifiedLink {
        url: entry.href.clone(),
        text: entry.text.clone(),
        rel: entry.rel.clone(),
        target: entry.target.clone(),
        is_valid: true,
        error: None,
    };

    // Parsed without a base: relative hrefs are malformed, not resolved
    match Url::parse(&entry.href) {
        Ok(parsed) if parsed.origin() == base.origin() => (LinkBucket::Internal, link),
        Ok(_) => (LinkBucket::External, link),
        Err(e) => {
            link.is_valid = false;
            link.error = Some(e.to_string());
            (LinkBucket::Broken, link)
        }
    }
}

/// Buckets every entry with a non-empty href. Order within a bucket follows the report.
pub fn classify_links(base: &Url, entries: &[LinkEntry]) -> LinkDetails {
    let mut details = LinkDetails::default();

    for entry in entries.iter().filter(|e| !e.href.is_empty()) {
        let (bucket, link) = classify_link(base, entry);
        match bucket {
            LinkBucket::Internal => details.internal.push(link),
            LinkBucket::External => details.external.push(link),
            LinkBucket::Broken => details.broken.push(link),
        }
    }

    details
}
