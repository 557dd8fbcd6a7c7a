use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::FailureInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub comment_count: u32,
    pub points: u32,
    pub created_at: Option<DateTime<Utc>>,
}

impl Hit {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            author: String::new(),
            comment_count: 0,
            points: 0,
            created_at: None,
        }
    }

    // Human readable age, e.g. "3 hours ago"
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(created_at) = self.created_at else {
            return String::new();
        };

        let secs = (now - created_at).num_seconds().max(0);
        let (value, unit) = match secs {
            0..=59 => (secs, "second"),
            60..=3599 => (secs / 60, "minute"),
            3600..=86_399 => (secs / 3600, "hour"),
            86_400..=2_591_999 => (secs / 86_400, "day"),
            2_592_000..=31_535_999 => (secs / 2_592_000, "month"),
            _ => (secs / 31_536_000, "year"),
        };

        if value == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", value, unit)
        }
    }
}

// One fetch response: the hits of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub hits: Vec<Hit>,
    pub page: u32,
    // Total number of pages the server reports for the query, if known
    pub nb_pages: Option<u32>,
}

impl ResultPage {
    pub fn new(hits: Vec<Hit>, page: u32) -> Self {
        Self {
            hits,
            page,
            nb_pages: None,
        }
    }
}

// Hits accumulated for one query across every merged page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    pub page: u32,
    pub nb_pages: Option<u32>,
}

impl SearchResults {
    pub fn has_more(&self) -> bool {
        match (self.page.checked_add(1), self.nb_pages) {
            (None, _) => false,
            (Some(next), Some(total)) => next < total,
            (Some(_), None) => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(FailureInfo),
}

impl Status {
    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed(_))
    }
}

// Wire format of the Algolia search endpoint

#[derive(Debug, Deserialize)]
pub(crate) struct ApiHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub title: Option<String>,
    // Comment hits carry no title of their own, only the parent story's
    pub story_title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub num_comments: Option<u32>,
    pub points: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub hits: Vec<ApiHit>,
    pub page: u32,
    #[serde(rename = "nbPages")]
    pub nb_pages: Option<u32>,
}

impl From<ApiHit> for Hit {
    fn from(hit: ApiHit) -> Self {
        let title = hit.title.or(hit.story_title).unwrap_or_default();

        Self {
            id: hit.object_id,
            title: html_escape::decode_html_entities(&title).to_string(),
            url: hit.url.unwrap_or_default(),
            author: hit.author.unwrap_or_default(),
            comment_count: hit.num_comments.unwrap_or(0),
            points: hit.points.unwrap_or(0),
            created_at: hit.created_at,
        }
    }
}

impl From<ApiResponse> for ResultPage {
    fn from(response: ApiResponse) -> Self {
        Self {
            hits: response.hits.into_iter().map(Hit::from).collect(),
            page: response.page,
            nb_pages: response.nb_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_api_response_with_null_fields() {
        let body = r#"{
            "hits": [
                {"objectID": "1", "title": "Redux &amp; React", "url": "https://redux.js.org",
                 "author": "dan", "num_comments": 12, "points": 340,
                 "created_at": "2018-03-14T03:50:30.000Z"},
                {"objectID": "2", "title": null, "story_title": "Parent story",
                 "url": null, "author": "bob", "num_comments": null, "points": null}
            ],
            "page": 0,
            "nbPages": 3
        }"#;

        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let page = ResultPage::from(response);

        assert_eq!(page.page, 0);
        assert_eq!(page.nb_pages, Some(3));
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[0].title, "Redux & React");
        assert_eq!(page.hits[0].points, 340);
        assert!(page.hits[0].created_at.is_some());
        assert_eq!(page.hits[1].title, "Parent story");
        assert_eq!(page.hits[1].url, "");
        assert_eq!(page.hits[1].comment_count, 0);
    }

    #[test]
    fn test_time_ago() {
        let now = Utc::now();
        let mut hit = Hit::new("1", "a");
        assert_eq!(hit.time_ago(now), "");

        hit.created_at = Some(now - Duration::hours(3));
        assert_eq!(hit.time_ago(now), "3 hours ago");

        hit.created_at = Some(now - Duration::minutes(1));
        assert_eq!(hit.time_ago(now), "1 minute ago");
    }

    #[test]
    fn test_has_more() {
        let mut results = SearchResults::default();
        assert!(results.has_more());

        results.nb_pages = Some(2);
        assert!(results.has_more());

        results.page = 1;
        assert!(!results.has_more());

        results.page = u32::MAX;
        results.nb_pages = None;
        assert!(!results.has_more());
    }
}
