//! Remote class-search API source
//!
//! Issues one `GET {base_url}/search?department=D&term=T` per department,
//! sequentially with a fixed delay between requests. A department whose
//! request fails is recorded in the summary and skipped.

use super::{CourseSource, FetchReport, RecordOutcome, SkipReason};
use crate::config::FetchConfig;
use crate::core::models::CourseRecord;
use crate::core::normalize::normalize_course_id;
use crate::error::{CatalogError, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::thread;
use std::time::Duration;

/// Default per-request timeout when the config leaves it unset
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent used when the config leaves it unset
const DEFAULT_USER_AGENT: &str = concat!("coursegraph/", env!("CARGO_PKG_VERSION"));

/// Settings for the remote catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSourceConfig {
    /// Base URL; `/search` is appended
    pub base_url: String,
    /// Term query parameter
    pub term: String,
    /// Departments fetched in order
    pub departments: Vec<String>,
    /// Pause between two department requests
    pub request_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl ApiSourceConfig {
    /// Build the source settings from the `[fetch]` config section
    #[must_use]
    pub fn from_config(fetch: &FetchConfig) -> Self {
        let timeout_secs = if fetch.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            fetch.timeout_secs
        };
        let user_agent = if fetch.user_agent.is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            fetch.user_agent.clone()
        };

        Self {
            base_url: fetch.base_url.trim_end_matches('/').to_string(),
            term: fetch.term.clone(),
            departments: fetch.departments.clone(),
            request_delay: Duration::from_millis(fetch.delay_ms),
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct ClassSearchResponse {
    #[serde(default)]
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
struct ClassEntry {
    #[serde(default)]
    course_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    units: serde_json::Value,
    #[serde(default)]
    description: Option<String>,
}

impl ClassEntry {
    fn into_outcome(self) -> RecordOutcome {
        let raw_id = self.course_id.unwrap_or_default();
        if raw_id.trim().is_empty() {
            return RecordOutcome::skipped(SkipReason::MissingIdentifier, "class without course_id");
        }
        let Some(id) = normalize_course_id(&raw_id) else {
            return RecordOutcome::skipped(SkipReason::InvalidIdentifier, raw_id);
        };

        RecordOutcome::Accepted(CourseRecord::new(
            id,
            self.title.unwrap_or_default().trim().to_string(),
            units_to_string(&self.units),
            self.description.unwrap_or_default().trim().to_string(),
        ))
    }
}

fn units_to_string(units: &serde_json::Value) -> String {
    match units {
        serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => "0".to_string(),
    }
}

/// Parse one department's search response body
///
/// # Errors
/// Returns a parse error if the body is not the expected JSON shape
pub fn parse_department_response(body: &str) -> Result<Vec<RecordOutcome>> {
    let response: ClassSearchResponse = serde_json::from_str(body)
        .map_err(|e| CatalogError::parse(format!("unexpected class search response: {e}")))?;
    Ok(response
        .classes
        .into_iter()
        .map(ClassEntry::into_outcome)
        .collect())
}

/// Remote class-search API
#[derive(Debug, Clone)]
pub struct ApiSource {
    config: ApiSourceConfig,
    client: Client,
}

impl ApiSource {
    /// Create a source with its own HTTP client
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: ApiSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Settings this source was built with
    #[must_use]
    pub const fn config(&self) -> &ApiSourceConfig {
        &self.config
    }

    fn fetch_department(&self, department: &str) -> Result<Vec<RecordOutcome>> {
        let body = self
            .client
            .get(self.config.search_url())
            .query(&[("department", department), ("term", self.config.term.as_str())])
            .send()?
            .error_for_status()?
            .text()?;
        parse_department_response(&body)
    }
}

impl CourseSource for ApiSource {
    fn describe(&self) -> String {
        format!("{} (term {})", self.config.search_url(), self.config.term)
    }

    fn fetch(&self) -> Result<FetchReport> {
        let mut report = FetchReport::new();

        for (idx, department) in self.config.departments.iter().enumerate() {
            if idx > 0 && !self.config.request_delay.is_zero() {
                thread::sleep(self.config.request_delay);
            }

            crate::info!("Fetching courses for department: {department}");
            match self.fetch_department(department) {
                Ok(outcomes) => {
                    crate::debug!("{department}: {} classes returned", outcomes.len());
                    report.extend(outcomes);
                }
                Err(e) => {
                    crate::warn!("Error fetching {department}: {e}");
                    report.fail_unit(department.clone(), e);
                }
            }
        }

        crate::info!("Fetched {} courses ({})", report.records.len(), report.summary);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, departments: &[&str]) -> ApiSourceConfig {
        ApiSourceConfig {
            base_url: base_url.to_string(),
            term: "2024-FALL".to_string(),
            departments: departments.iter().map(|d| (*d).to_string()).collect(),
            request_delay: Duration::ZERO,
            timeout: Duration::from_secs(2),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[test]
    fn test_parse_department_response() {
        let body = r#"{
            "classes": [
                {"course_id": "COMPSCI 61A", "title": "SICP", "units": "4", "description": "Intro."},
                {"course_id": "compsci 70", "title": "Discrete Math", "units": 4, "description": null},
                {"course_id": "", "title": "Orphan"},
                {"course_id": "COMPSCI C8", "title": "Data 8 cross-listing"}
            ]
        }"#;
        let outcomes = parse_department_response(body).unwrap();
        assert_eq!(outcomes.len(), 4);

        let RecordOutcome::Accepted(first) = &outcomes[0] else {
            panic!("expected accepted record");
        };
        assert_eq!(first.id, "COMPSCI 61A");
        assert_eq!(first.name, "SICP");

        let RecordOutcome::Accepted(second) = &outcomes[1] else {
            panic!("expected accepted record");
        };
        assert_eq!(second.id, "COMPSCI 70");
        assert_eq!(second.units, "4");
        assert_eq!(second.description, "");

        assert!(matches!(
            outcomes[2],
            RecordOutcome::Skipped { reason: SkipReason::MissingIdentifier, .. }
        ));
        assert!(matches!(
            outcomes[3],
            RecordOutcome::Skipped { reason: SkipReason::InvalidIdentifier, .. }
        ));
    }

    #[test]
    fn test_parse_response_without_classes() {
        assert!(parse_department_response("{}").unwrap().is_empty());
        assert!(parse_department_response("not json").is_err());
    }

    #[test]
    fn test_units_to_string() {
        assert_eq!(units_to_string(&serde_json::json!("2-4")), "2-4");
        assert_eq!(units_to_string(&serde_json::json!(3)), "3");
        assert_eq!(units_to_string(&serde_json::Value::Null), "0");
    }

    #[test]
    fn test_config_from_fetch_section() {
        let fetch = FetchConfig {
            base_url: "https://example.edu/api/classes/".to_string(),
            term: "2025-SPRING".to_string(),
            departments: vec!["MATH".to_string()],
            delay_ms: 250,
            timeout_secs: 0,
            user_agent: String::new(),
        };
        let cfg = ApiSourceConfig::from_config(&fetch);
        assert_eq!(cfg.search_url(), "https://example.edu/api/classes/search");
        assert_eq!(cfg.request_delay, Duration::from_millis(250));
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(cfg.user_agent.starts_with("coursegraph/"));
    }

    #[test]
    fn test_unreachable_departments_are_skipped() {
        // Nothing listens on port 1, so every request fails fast.
        let source = ApiSource::new(config("http://127.0.0.1:1", &["COMPSCI", "MATH"])).unwrap();
        let report = source.fetch().unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.summary.failed_units.len(), 2);
        assert_eq!(report.summary.failed_units[1].unit, "MATH");
    }

    #[test]
    fn test_no_delay_before_first_request() {
        let mut cfg = config("http://127.0.0.1:1", &["COMPSCI"]);
        cfg.request_delay = Duration::from_secs(2);
        let source = ApiSource::new(cfg).unwrap();

        let started = Instant::now();
        let report = source.fetch().unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.summary.failed_units.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_department_does_not_stop_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("department", "MATH"))
            .and(query_param("term", "2024-FALL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"classes": [{"course_id": "MATH 1A", "title": "Calculus", "units": 4, "description": "Limits."}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("department", "PHYSICS"))
            .and(query_param("term", "2024-FALL"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri(), &["MATH", "PHYSICS"]);
        cfg.request_delay = Duration::from_millis(200);

        // The blocking client cannot live on the async runtime
        let (report, elapsed, departments) = tokio::task::spawn_blocking(move || {
            let source = ApiSource::new(cfg).unwrap();
            let departments = source.config().departments.len();
            let started = Instant::now();
            let report = source.fetch().unwrap();
            (report, started.elapsed(), departments)
        })
        .await
        .unwrap();

        assert_eq!(departments, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].id, "MATH 1A");
        assert_eq!(report.records[0].units, "4");
        assert_eq!(report.summary.failed_units.len(), 1);
        assert_eq!(report.summary.failed_units[0].unit, "PHYSICS");
        assert!(elapsed >= Duration::from_millis(200));
    }
}
