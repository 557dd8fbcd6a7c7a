use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, SearchError};
use crate::models::{ApiResponse, ResultPage};

const PATH_SEARCH: &str = "/search";

// Anything that can answer a paged search. The session only talks to this trait,
// so tests can swap in a scripted backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, page: u32, hits_per_page: u32) -> Result<ResultPage>;
}

pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn search_url(&self, query: &str, page: u32, hits_per_page: u32) -> String {
        format!(
            "{}{}?query={}&page={}&hitsPerPage={}",
            self.base_url,
            PATH_SEARCH,
            urlencoding::encode(query),
            page,
            hits_per_page
        )
    }
}

#[async_trait]
impl SearchBackend for HackerNewsClient {
    async fn search(&self, query: &str, page: u32, hits_per_page: u32) -> Result<ResultPage> {
        let url = self.search_url(query, page, hits_per_page);
        tracing::debug!(%url, "Requesting search page");

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        // A body that doesn't match the schema surfaces as a decode error
        let api_resp: ApiResponse = resp.json().await?;
        let result = ResultPage::from(api_resp);

        tracing::debug!(query, page = result.page, count = result.hits.len(), "Search page received");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let client = HackerNewsClient::new(&Config::default()).unwrap();
        let url = client.search_url("rust & go", 2, 100);

        assert_eq!(
            url,
            "https://hn.algolia.com/api/v1/search?query=rust%20%26%20go&page=2&hitsPerPage=100"
        );
    }

    #[test]
    fn test_search_url_uses_configured_base() {
        let config = Config {
            base_url: "http://127.0.0.1:9999/v1".into(),
            ..Config::default()
        };
        let client = HackerNewsClient::new(&config).unwrap();

        assert_eq!(
            client.search_url("redux", 0, 20),
            "http://127.0.0.1:9999/v1/search?query=redux&page=0&hitsPerPage=20"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Grab a free port, then close it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = Config {
            base_url: format!("http://127.0.0.1:{}", port),
            timeout_secs: 2,
            ..Config::default()
        };
        let client = HackerNewsClient::new(&config).unwrap();

        let err = client.search("redux", 0, 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));
    }
}
