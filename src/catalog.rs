use crate::{
    Error, Result,
    models::{RecipeDetail, SearchPage},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Remote recipe catalog
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    async fn search(&self, query: &str, offset: usize, limit: usize) -> Result<SearchPage>;
    async fn recipe(&self, id: i64) -> Result<RecipeDetail>;
}

pub struct SpoonacularClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SpoonacularClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(10))
    }

    /// Fails when the HTTP client cannot be built (e.g. no TLS backend).
    pub fn with_timeout(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("RecipeFinder/1.0")
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "catalog request to {} failed: {}",
                url,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecipeCatalog for SpoonacularClient {
    async fn search(&self, query: &str, offset: usize, limit: usize) -> Result<SearchPage> {
        let url = format!("{}/recipes/complexSearch", self.base_url);
        log::debug!("searching '{}' at offset {} (limit {})", query, offset, limit);

        self.get_json(
            &url,
            &[
                ("query", query.to_string()),
                ("offset", offset.to_string()),
                ("number", limit.to_string()),
            ],
        )
        .await
    }

    async fn recipe(&self, id: i64) -> Result<RecipeDetail> {
        let url = format!("{}/recipes/{}/information", self.base_url, id);
        log::debug!("fetching recipe {}", id);

        self.get_json(&url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    /// Minimal catalog that answers every request with a canned status and body.
    struct StubServer {
        base_url: String,
        requests: mpsc::Receiver<String>,
        handle: Option<thread::JoinHandle<()>>,
    }

    impl StubServer {
        fn spawn(status: u16, body: &'static str, expected_requests: usize) -> Self {
            let server = tiny_http::Server::http("127.0.0.1:0").expect("start catalog stub");
            let base_url = format!("http://{}", server.server_addr());
            let (tx, rx) = mpsc::channel();

            let handle = thread::spawn(move || {
                for _ in 0..expected_requests {
                    let request = match server.recv() {
                        Ok(req) => req,
                        Err(_) => break,
                    };
                    let _ = tx.send(request.url().to_string());
                    let response = tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(
                            "Content-Type: application/json"
                                .parse::<tiny_http::Header>()
                                .unwrap(),
                        );
                    let _ = request.respond(response);
                }
            });

            Self {
                base_url,
                requests: rx,
                handle: Some(handle),
            }
        }

        fn finish(mut self) -> Vec<String> {
            if let Some(handle) = self.handle.take() {
                handle.join().unwrap();
            }
            self.requests.try_iter().collect()
        }
    }

    #[tokio::test]
    async fn test_search_sends_paging_parameters() {
        let stub = StubServer::spawn(
            200,
            r#"{"results":[{"id":1,"title":"Pasta"}],"offset":20,"number":20,"totalResults":45}"#,
            1,
        );
        let client = SpoonacularClient::new(format!("{}/", stub.base_url), "secret".to_string()).unwrap();

        let page = client.search("pasta", 20, 20).await.unwrap();
        assert_eq!(page.total_results, 45);
        assert_eq!(page.recipes.len(), 1);

        let urls = stub.finish();
        assert_eq!(urls.len(), 1);
        let url = &urls[0];
        assert!(url.starts_with("/recipes/complexSearch?"), "unexpected path: {}", url);
        assert!(url.contains("query=pasta"));
        assert!(url.contains("offset=20"));
        assert!(url.contains("number=20"));
        assert!(url.contains("apiKey=secret"));
    }

    #[tokio::test]
    async fn test_recipe_fetches_information() {
        let stub = StubServer::spawn(
            200,
            r#"{"id":716429,"title":"Pasta with Garlic","servings":2,"extendedIngredients":[{"id":1001,"name":"butter","amount":1.0,"unit":"tbsp"}]}"#,
            1,
        );
        let client = SpoonacularClient::new(stub.base_url.clone(), "secret".to_string()).unwrap();

        let detail = client.recipe(716429).await.unwrap();
        assert_eq!(detail.title, "Pasta with Garlic");
        assert_eq!(detail.extended_ingredients.len(), 1);

        let urls = stub.finish();
        assert!(urls[0].starts_with("/recipes/716429/information?"));
    }

    #[tokio::test]
    async fn test_error_status_is_network_failure() {
        let stub = StubServer::spawn(402, r#"{"status":"failure","code":402}"#, 1);
        let client = SpoonacularClient::new(stub.base_url.clone(), "secret".to_string()).unwrap();

        let err = client.search("pasta", 0, 20).await.unwrap_err();
        assert!(err.is_network(), "expected network failure, got {:?}", err);
        stub.finish();
    }

    #[tokio::test]
    async fn test_malformed_body_is_network_failure() {
        let stub = StubServer::spawn(200, "not json", 1);
        let client = SpoonacularClient::new(stub.base_url.clone(), "secret".to_string()).unwrap();

        let err = client.recipe(1).await.unwrap_err();
        assert!(err.is_network());
        stub.finish();
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        // accepts connections into the backlog but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let client =
            SpoonacularClient::with_timeout(base_url, "secret".to_string(), Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = client.search("pasta", 0, 20).await.unwrap_err();
        assert!(err.is_network());
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
