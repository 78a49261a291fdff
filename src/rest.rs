use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::ClientConfig;
use crate::error::{ClientError, FailedResponse, ServiceResult};
use crate::models::*;
use crate::services::{EntityService, EntityWriter, Page, QueryOptions};

const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Entities exposed as a REST collection under `/api/<PATH>`.
pub trait Resource: Serialize + DeserializeOwned + Identified + Send + Sync + 'static {
    const PATH: &'static str;
}

impl Resource for Person { const PATH: &'static str = "people"; }
impl Resource for Profile { const PATH: &'static str = "profiles"; }
impl Resource for AccountDeletion { const PATH: &'static str = "account-deletions"; }
impl Resource for Conversation { const PATH: &'static str = "conversations"; }
impl Resource for Contact { const PATH: &'static str = "contacts"; }
impl Resource for Like { const PATH: &'static str = "likes"; }
impl Resource for Post { const PATH: &'static str = "posts"; }
impl Resource for Participation { const PATH: &'static str = "participations"; }
impl Resource for Message { const PATH: &'static str = "messages"; }

#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl RestClient {
    pub fn new(cfg: &ClientConfig) -> ServiceResult<Self> {
        let http = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            token: cfg.auth_token.clone(),
            http,
        })
    }

    fn collection_url<T: Resource>(&self) -> String {
        format!("{}/api/{}", self.base_url, T::PATH)
    }

    fn item_url<T: Resource>(&self, id: Id) -> String {
        format!("{}/api/{}/{}", self.base_url, T::PATH, id)
    }

    fn authorized(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    // non-2xx responses keep their raw body for message extraction;
    // 404 and 409 stay `Rejected` too, see `ClientError::is_not_found`/`is_conflict`
    async fn checked(resp: Response) -> ServiceResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        warn!("request to {url} rejected status={} body_len={}", status.as_u16(), body.len());
        Err(ClientError::Rejected(FailedResponse::new(status.as_u16(), body)))
    }

    async fn send_json<T: Resource>(&self, rb: RequestBuilder) -> ServiceResult<T> {
        let resp = Self::checked(self.authorized(rb).send().await?).await?;
        Ok(resp.json::<T>().await?)
    }
}

fn total_count(resp: &Response) -> Option<u64> {
    resp.headers()
        .get(TOTAL_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl<T: Resource> EntityService<T> for RestClient {
    async fn query(&self, opts: QueryOptions) -> ServiceResult<Page<T>> {
        let url = self.collection_url::<T>();
        debug!("GET {url} {:?}", opts);
        let rb = self.http.get(&url).query(&opts.to_query_pairs());
        let resp = Self::checked(self.authorized(rb).send().await?).await?;
        let total_count = total_count(&resp);
        let items = resp.json::<Vec<T>>().await?;
        Ok(Page { items, total_count })
    }

    async fn find(&self, id: Id) -> ServiceResult<T> {
        let url = self.item_url::<T>(id);
        debug!("GET {url}");
        self.send_json(self.http.get(&url)).await
    }
}

#[async_trait]
impl<T: Resource> EntityWriter<T> for RestClient {
    async fn create(&self, entity: T) -> ServiceResult<T> {
        let url = self.collection_url::<T>();
        debug!("POST {url}");
        self.send_json(self.http.post(&url).json(&entity)).await
    }

    async fn update(&self, entity: T) -> ServiceResult<T> {
        let url = self.collection_url::<T>();
        debug!("PUT {url} id={:?}", entity.id());
        self.send_json(self.http.put(&url).json(&entity)).await
    }

    async fn delete(&self, id: Id) -> ServiceResult<()> {
        let url = self.item_url::<T>(id);
        debug!("DELETE {url}");
        Self::checked(self.authorized(self.http.delete(&url)).send().await?).await?;
        Ok(())
    }
}
