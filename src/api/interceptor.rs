use crate::authorizer::Authorizer;
use crate::error::Result;
use crate::origin::OriginMatcher;
use crate::session::Session;
use reqwest::{IntoUrl, Method};
use std::sync::Arc;
use tracing::debug;

/// Applies origin matching and authorization to outgoing requests.
pub struct RequestInterceptor {
    matcher: OriginMatcher,
    authorizer: Arc<dyn Authorizer>,
    session: Arc<Session>,
}

impl RequestInterceptor {
    pub fn new(
        matcher: OriginMatcher,
        authorizer: Arc<dyn Authorizer>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            matcher,
            authorizer,
            session,
        }
    }

    pub fn matcher(&self) -> &OriginMatcher {
        &self.matcher
    }

    /// Decorate `request` when its target is trusted.
    pub async fn intercept(&self, request: &mut reqwest::Request) {
        if !self.matcher.is_trusted(request.url().as_str()) {
            debug!(url = %request.url(), "untrusted origin; not authorizing");
            return;
        }
        let state = self.session.state().await;
        self.authorizer.authorize(request, &state);
    }
}

/// A `reqwest::Client` whose every request passes through one interceptor.
pub struct AuthorizedClient {
    client: reqwest::Client,
    interceptor: RequestInterceptor,
}

impl AuthorizedClient {
    pub fn new(client: reqwest::Client, interceptor: RequestInterceptor) -> Self {
        Self {
            client,
            interceptor,
        }
    }

    pub fn interceptor(&self) -> &RequestInterceptor {
        &self.interceptor
    }

    /// Start a request; hand the builder back to `send`.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> reqwest::RequestBuilder {
        self.request(Method::GET, url)
    }

    pub async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = builder.build()?;
        self.execute(request).await
    }

    pub async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response> {
        self.interceptor.intercept(&mut request).await;
        Ok(self.client.execute(request).await?)
    }
}
