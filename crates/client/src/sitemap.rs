//! Sitemap XML for the public site.
//!
//! Static pages come first, then one `<url>` per drug:
//!
//! | page                           | changefreq | priority |
//! |--------------------------------|------------|----------|
//! | `/`                            | daily      | 1.0      |
//! | `/about` `/contact` `/privacy` | yearly     | 0.5      |
//! | `/drug/<name>`                 | weekly     | 0.8      |

use chrono::{DateTime, SecondsFormat, Utc};
use drugbit_core::{Drug, Error};
use serde::Serialize;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const STATIC_PAGES: &[(&str, &str, f32)] = &[
    ("/", "daily", 1.0),
    ("/about", "yearly", 0.5),
    ("/contact", "yearly", 0.5),
    ("/privacy", "yearly", 0.5),
];

const DRUG_CHANGEFREQ: &str = "weekly";
const DRUG_PRIORITY: f32 = 0.8;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: String,
}

#[derive(Serialize)]
#[serde(rename = "urlset")]
struct UrlSet<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "url")]
    urls: &'a [SitemapEntry],
}

/// Builds sitemap entries and XML for a site base URL.
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    site_url: String,
    lastmod: DateTime<Utc>,
}

impl SitemapBuilder {
    pub fn new(site_url: impl Into<String>) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        Self { site_url, lastmod: Utc::now() }
    }

    /// Timestamp written to every entry.
    pub fn with_lastmod(mut self, lastmod: DateTime<Utc>) -> Self {
        self.lastmod = lastmod;
        self
    }

    /// The drug's own url, else `<site>/drug/<percent-encoded name>`.
    pub fn drug_loc(&self, drug: &Drug) -> String {
        match drug.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}/drug/{}", self.site_url, urlencoding::encode(drug.name.trim())),
        }
    }

    fn entry(&self, loc: String, changefreq: &'static str, priority: f32) -> SitemapEntry {
        SitemapEntry {
            loc,
            lastmod: self.lastmod.to_rfc3339_opts(SecondsFormat::Millis, true),
            changefreq,
            priority: format!("{priority:.1}"),
        }
    }

    pub fn entries(&self, drugs: &[Drug]) -> Vec<SitemapEntry> {
        let mut entries: Vec<SitemapEntry> = STATIC_PAGES
            .iter()
            .map(|(path, changefreq, priority)| self.entry(format!("{}{path}", self.site_url), changefreq, *priority))
            .collect();

        let mut skipped = 0;
        for drug in drugs {
            if drug.name.trim().is_empty() {
                skipped += 1;
                continue;
            }
            entries.push(self.entry(self.drug_loc(drug), DRUG_CHANGEFREQ, DRUG_PRIORITY));
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped drugs without a name");
        }
        if drugs.is_empty() {
            tracing::warn!("no drugs found for sitemap");
        }
        entries
    }

    /// Render the full `<urlset>` document.
    pub fn render(&self, drugs: &[Drug]) -> Result<String, Error> {
        let entries = self.entries(drugs);
        let body = quick_xml::se::to_string(&UrlSet { xmlns: SITEMAP_NS, urls: &entries })
            .map_err(|e| Error::SitemapFailed(e.to_string()))?;
        tracing::debug!(urls = entries.len(), "rendered sitemap");
        Ok(format!("{XML_DECLARATION}\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builder() -> SitemapBuilder {
        let lastmod = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        SitemapBuilder::new("https://www.drugbit.info/").with_lastmod(lastmod)
    }

    #[test]
    fn test_static_pages_first() {
        let entries = builder().entries(&[]);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].loc, "https://www.drugbit.info/");
        assert_eq!(entries[0].changefreq, "daily");
        assert_eq!(entries[0].priority, "1.0");
        assert_eq!(entries[3].loc, "https://www.drugbit.info/privacy");
        assert_eq!(entries[3].priority, "0.5");
        assert_eq!(entries[0].lastmod, "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_drug_loc() {
        let builder = builder();
        assert_eq!(builder.drug_loc(&Drug::named(1, "Nitrous Oxide")), "https://www.drugbit.info/drug/Nitrous%20Oxide");

        let mut drug = Drug::named(2, "Propofol");
        drug.url = Some("https://cdn.example/propofol".into());
        assert_eq!(builder.drug_loc(&drug), "https://cdn.example/propofol");

        drug.url = Some("  ".into());
        assert_eq!(builder.drug_loc(&drug), "https://www.drugbit.info/drug/Propofol");
    }

    #[test]
    fn test_skips_nameless_drugs() {
        let entries = builder().entries(&[Drug::named(1, "Ketamine"), Drug::named(2, " ")]);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[4].changefreq, "weekly");
        assert_eq!(entries[4].priority, "0.8");
    }

    #[test]
    fn test_render_escapes_text() {
        let mut drug = Drug::named(1, "Ketamine");
        drug.url = Some("https://x.example/drug?a=1&b=2".into());

        let xml = builder().render(&[drug]).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://x.example/drug?a=1&amp;b=2</loc>"));
        assert!(!xml.contains("a=1&b=2"));
        assert_eq!(xml.matches("<url>").count(), 5);
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
    }
}
