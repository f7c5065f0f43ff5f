use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    RequestBuilder,
};

#[derive(Clone, Debug)]
pub struct TestClient {
    pub base: String,
    pub client: reqwest::Client,
}

impl TestClient {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// A copy of this client that sends `token` on every request.
    pub fn clone_with_token(&self, token: &str) -> TestClient {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .expect("Building authorization header");
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        TestClient {
            base: self.base.clone(),
            client: reqwest::ClientBuilder::new()
                .default_headers(headers)
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Building client"),
        }
    }
}
