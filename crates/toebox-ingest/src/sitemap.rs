//! Sitemap parsing.
//!
//! Extracts `(url, lastmod?)` pairs from `<url>` blocks and child sitemap
//! URLs from `<sitemap>` blocks (sitemap-of-sitemaps indexes).

use regex::Regex;
use std::sync::OnceLock;

fn url_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<url>(.*?)</url>").expect("valid regex"))
}

fn sitemap_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<sitemap>(.*?)</sitemap>").expect("valid regex"))
}

fn loc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<loc>(.*?)</loc>").expect("valid regex"))
}

fn lastmod_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<lastmod>(.*?)</lastmod>").expect("valid regex"))
}

/// A content URL enumerated by a sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: Option<String>,
}

/// The result of parsing one sitemap body.
#[derive(Debug, Clone, Default)]
pub struct ParsedSitemap {
    /// Content URLs with their optional last-modified values
    pub entries: Vec<SitemapEntry>,
    /// Child sitemap URLs from an index sitemap
    pub nested: Vec<String>,
}

/// Parse a sitemap body. Malformed blocks are simply not matched, so a
/// broken sitemap degrades to zero entries rather than an error.
pub fn parse_sitemap(content: &str) -> ParsedSitemap {
    let mut parsed = ParsedSitemap::default();

    for block in url_block_re().captures_iter(content) {
        let body = &block[1];
        let Some(loc) = loc_re().captures(body) else {
            continue;
        };
        let url = loc[1].trim().to_string();
        if url.is_empty() {
            continue;
        }
        let last_modified = lastmod_re()
            .captures(body)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty());
        parsed.entries.push(SitemapEntry { url, last_modified });
    }

    for block in sitemap_block_re().captures_iter(content) {
        if let Some(loc) = loc_re().captures(&block[1]) {
            let url = loc[1].trim().to_string();
            if !url.is_empty() {
                parsed.nested.push(url);
            }
        }
    }

    parsed
}
