//! Reduces a raw Lighthouse report into the service's response shape.
//!
//! Audits are looked up by key and copied as-is. Anything the report does not
//! contain is serialized as `null` rather than failing the request.

pub mod links;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use links::{LinkDetails, LinkStatistics, classify_links, link_entries};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedResponse {
    pub url: String,
    pub fetch_time: Option<String>,
    pub category_scores: CategoryScores,
    pub performance_metrics: PerformanceMetrics,
    pub performance_optimizations: PerformanceOptimizations,
    pub seo_audit: SeoAudit,
    pub link_analysis: LinkAnalysis,
}

/// Scores on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScores {
    pub performance: Option<f64>,
    pub seo: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub first_contentful_paint: Option<Value>,
    pub largest_contentful_paint: Option<Value>,
    pub total_blocking_time: Option<Value>,
    pub cumulative_layout_shift: Option<Value>,
    pub speed_index: Option<Value>,
    pub time_to_interactive: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOptimizations {
    pub render_blocking_resources: Option<Value>,
    pub unminified_javascript: Option<Value>,
    #[serde(rename = "unminifiedCSS")]
    pub unminified_css: Option<Value>,
    #[serde(rename = "unusedCSS")]
    pub unused_css: Option<Value>,
    #[serde(rename = "unusedJavaScript")]
    pub unused_javascript: Option<Value>,
    pub image_optimization: Option<Value>,
    pub responsive_images: Option<Value>,
    pub efficient_cache: Option<Value>,
    pub modern_image_formats: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAudit {
    pub meta_description: Option<Value>,
    pub http_status_code: Option<Value>,
    pub crawlable: Option<Value>,
    pub robots_txt: Option<Value>,
    pub canonical: Option<Value>,
    pub hreflang: Option<Value>,
    pub font_size: Option<Value>,
    pub link_text: Option<Value>,
    pub crawlable_anchors: Option<Value>,
    pub mobile_viewport: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    /// The raw `links` audit.
    pub links: Option<Value>,
    pub link_details: LinkDetails,
    pub statistics: LinkStatistics,
}

/// Pure function of `report`; fails only when the final URL cannot serve as a base.
pub fn reduce(report: &Value) -> Result<ReducedResponse> {
    let final_url = final_url(report)?;
    let base = Url::parse(final_url)
        .map_err(|e| AppError::MalformedBaseUrl(format!("{final_url:?}: {e}")))?;

    let pick = |key: &str| audit(report, key);

    let links_audit = report.get("audits").and_then(|a| a.get("links"));
    let link_details = classify_links(&base, &link_entries(links_audit));
    let statistics = link_details.statistics();

    Ok(ReducedResponse {
        url: final_url.to_string(),
        fetch_time: report
            .get("fetchTime")
            .and_then(Value::as_str)
            .map(str::to_string),
        category_scores: CategoryScores {
            performance: category_score(report, "performance"),
            seo: category_score(report, "seo"),
        },
        performance_metrics: PerformanceMetrics {
            first_contentful_paint: pick("first-contentful-paint"),
            largest_contentful_paint: pick("largest-contentful-paint"),
            total_blocking_time: pick("total-blocking-time"),
            cumulative_layout_shift: pick("cumulative-layout-shift"),
            speed_index: pick("speed-index"),
            time_to_interactive: pick("interactive"),
        },
        performance_optimizations: PerformanceOptimizations {
            render_blocking_resources: pick("render-blocking-resources"),
            unminified_javascript: pick("unminified-javascript"),
            unminified_css: pick("unminified-css"),
            unused_css: pick("unused-css-rules"),
            unused_javascript: pick("unused-javascript"),
            image_optimization: pick("uses-optimized-images"),
            responsive_images: pick("uses-responsive-images"),
            efficient_cache: pick("uses-long-cache-ttl"),
            modern_image_formats: pick("modern-image-formats"),
        },
        seo_audit: SeoAudit {
            meta_description: pick("meta-description"),
            http_status_code: pick("http-status-code"),
            crawlable: pick("is-crawlable"),
            robots_txt: pick("robots-txt"),
            canonical: pick("canonical"),
            hreflang: pick("hreflang"),
            font_size: pick("font-size"),
            link_text: pick("link-text"),
            crawlable_anchors: pick("crawlable-anchors"),
            mobile_viewport: pick("viewport"),
        },
        link_analysis: LinkAnalysis {
            links: links_audit.cloned(),
            link_details,
            statistics,
        },
    })
}

// Lighthouse 10 renamed `finalUrl` to `finalDisplayedUrl`
fn final_url(report: &Value) -> Result<&str> {
    ["finalDisplayedUrl", "finalUrl"]
        .iter()
        .find_map(|key| report.get(*key).and_then(Value::as_str))
        .ok_or_else(|| AppError::MalformedBaseUrl("report has no final URL".to_string()))
}

fn audit(report: &Value, key: &str) -> Option<Value> {
    report.get("audits")?.get(key).cloned()
}

fn category_score(report: &Value, category: &str) -> Option<f64> {
    report
        .get("categories")?
        .get(category)?
        .get("score")?
        .as_f64()
        .map(|score| score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> Value {
        json!({
            "finalDisplayedUrl": "https://example.com/",
            "fetchTime": "2026-10-19T08:00:00.000Z",
            "categories": {
                "performance": { "id": "performance", "score": 0.93 },
                "seo": { "id": "seo", "score": 1 }
            },
            "audits": {
                "first-contentful-paint": {
                    "id": "first-contentful-paint",
                    "score": 0.99,
                    "displayValue": "0.6 s",
                    "numericValue": 612.5
                },
                "interactive": { "id": "interactive", "score": 1, "displayValue": "0.9 s" },
                "unminified-css": { "id": "unminified-css", "score": 1, "details": { "items": [] } },
                "viewport": { "id": "viewport", "score": 1 },
                "links": {
                    "id": "links",
                    "details": {
                        "type": "table",
                        "items": [
                            { "href": "https://example.com/about", "text": "About", "rel": "", "target": "" },
                            { "href": "https://other.com", "text": "Other", "rel": "noopener", "target": "_blank" },
                            { "href": "not a url", "text": "Bad" }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn reduces_full_report() {
        let reduced = reduce(&sample_report()).unwrap();

        assert_eq!(reduced.url, "https://example.com/");
        assert_eq!(reduced.fetch_time.as_deref(), Some("2026-10-19T08:00:00.000Z"));
        assert_eq!(reduced.category_scores.performance, Some(0.93 * 100.0));
        assert_eq!(reduced.category_scores.seo, Some(100.0));
        assert_eq!(
            reduced.performance_metrics.first_contentful_paint.as_ref().unwrap()["displayValue"],
            "0.6 s"
        );
        assert!(reduced.performance_metrics.time_to_interactive.is_some());
        assert!(reduced.seo_audit.mobile_viewport.is_some());

        let stats = &reduced.link_analysis.statistics;
        assert_eq!(stats.total_links, 3);
        assert_eq!(stats.internal_links, 1);
        assert_eq!(stats.external_links, 1);
        assert_eq!(stats.broken_links, 1);
        assert_eq!(reduced.link_analysis.link_details.external[0].target, "_blank");
    }

    #[test]
    fn missing_audits_serialize_as_null() {
        let report = json!({ "finalDisplayedUrl": "https://example.com/" });
        let reduced = reduce(&report).unwrap();
        assert!(reduced.category_scores.performance.is_none());
        assert!(reduced.performance_metrics.speed_index.is_none());
        assert!(reduced.link_analysis.links.is_none());
        assert_eq!(reduced.link_analysis.statistics.total_links, 0);

        let body = serde_json::to_value(&reduced).unwrap();
        assert!(body["fetchTime"].is_null());
        assert!(body["categoryScores"]["seo"].is_null());
        assert!(body["performanceMetrics"]["speedIndex"].is_null());
        assert!(body["performanceOptimizations"]["unusedCSS"].is_null());
        assert!(body["seoAudit"]["robotsTxt"].is_null());
        assert!(body["seoAudit"].as_object().unwrap().contains_key("hreflang"));
    }

    #[test]
    fn null_score_stays_absent() {
        let report = json!({
            "finalDisplayedUrl": "https://example.com/",
            "categories": { "performance": { "score": null }, "seo": { "score": 0 } }
        });
        let reduced = reduce(&report).unwrap();
        assert_eq!(reduced.category_scores.performance, None);
        assert_eq!(reduced.category_scores.seo, Some(0.0));
    }

    #[test]
    fn scores_are_scaled_into_percent_range() {
        for score in [0.0, 0.25, 0.5, 0.57, 0.999, 1.0] {
            let report = json!({
                "finalDisplayedUrl": "https://example.com/",
                "categories": { "performance": { "score": score } }
            });
            let scaled = reduce(&report).unwrap().category_scores.performance.unwrap();
            assert_eq!(scaled, score * 100.0);
            assert!((0.0..=100.0).contains(&scaled));
        }
    }

    #[test]
    fn field_names_match_response_contract() {
        let body = serde_json::to_value(reduce(&sample_report()).unwrap()).unwrap();
        let optimizations = body["performanceOptimizations"].as_object().unwrap();
        for key in [
            "unminifiedJavascript",
            "unminifiedCSS",
            "unusedCSS",
            "unusedJavaScript",
            "efficientCache",
        ] {
            assert!(optimizations.contains_key(key), "missing {key}");
        }
        assert!(body["performanceMetrics"].get("timeToInteractive").is_some());
        assert_eq!(body["linkAnalysis"]["statistics"]["totalLinks"], 3);
        assert_eq!(body["linkAnalysis"]["linkDetails"]["internal"][0]["isValid"], true);
        assert_eq!(body["linkAnalysis"]["linkDetails"]["broken"][0]["isValid"], false);
        assert!(body["linkAnalysis"]["linkDetails"]["internal"][0].get("error").is_none());
    }

    #[test]
    fn reduce_is_idempotent() {
        let report = sample_report();
        assert_eq!(reduce(&report).unwrap(), reduce(&report).unwrap());
    }

    #[test]
    fn falls_back_to_legacy_final_url() {
        let report = json!({ "finalUrl": "https://legacy.example/" });
        assert_eq!(reduce(&report).unwrap().url, "https://legacy.example/");
    }

    #[test]
    fn unparseable_final_url_is_rejected() {
        let mut report = sample_report();
        report["finalDisplayedUrl"] = json!("not a url");
        let err = reduce(&report).unwrap_err();
        assert!(matches!(err, AppError::MalformedBaseUrl(_)));
    }

    #[test]
    fn missing_final_url_is_rejected() {
        let err = reduce(&json!({ "audits": {} })).unwrap_err();
        assert!(matches!(err, AppError::MalformedBaseUrl(_)));
    }
}
