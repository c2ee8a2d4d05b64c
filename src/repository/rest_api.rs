// ==========================================
// 清洁业务数据导入 - REST 数据接口实现
// ==========================================
// 职责: PostgREST 方言的表级读写 ({url}/rest/v1/{table})
// 约定: 404 视为目标表不存在；其余非 2xx 视为后端拒绝
//       不设客户端超时，沿用传输层默认
// ==========================================

use crate::repository::data_api::{DataApi, Filter, Page, Row};
use crate::repository::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_INSERT: &str = "return=minimal,resolution=ignore-duplicates";

pub struct RestDataApi {
    client: Client,
    base_url: String,
}

impl RestDataApi {
    /// 创建客户端
    ///
    /// # 参数
    /// - url: 项目地址（不含 /rest/v1）
    /// - service_key: 同时用作 apikey 与 Bearer 令牌
    pub fn new(url: &str, service_key: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_key)
            .map_err(|e| ApiError::encode(format!("apikey 含非法字符: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", service_key))
            .map_err(|e| ApiError::encode(format!("Authorization 含非法字符: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn with_filters(builder: RequestBuilder, filters: &[Filter]) -> RequestBuilder {
        let pairs: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();
        builder.query(&pairs)
    }

    async fn send(table: &str, builder: RequestBuilder) -> ApiResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::table_absent(table));
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::rejected(status.as_u16(), body))
    }
}

#[async_trait]
impl DataApi for RestDataApi {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn select(
        &self,
        table: &str,
        columns: &[&str],
        filters: &[Filter],
        page: Page,
    ) -> ApiResult<Vec<Row>> {
        let builder = self.client.get(self.table_url(table)).query(&[
            ("select", columns.join(",")),
            ("limit", page.limit.to_string()),
            ("offset", page.offset.to_string()),
        ]);
        let resp = Self::send(table, Self::with_filters(builder, filters)).await?;
        resp.json::<Vec<Row>>()
            .await
            .map_err(|e| ApiError::decode(e.to_string()))
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> ApiResult<()> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", PREFER_INSERT)
            .json(rows);
        Self::send(table, builder).await.map(|_| ())
    }

    async fn patch(&self, table: &str, filters: &[Filter], fields: &Row) -> ApiResult<()> {
        let builder = self
            .client
            .patch(self.table_url(table))
            .header("Prefer", PREFER_MINIMAL)
            .json(fields);
        Self::send(table, Self::with_filters(builder, filters))
            .await
            .map(|_| ())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> ApiResult<()> {
        let builder = self
            .client
            .delete(self.table_url(table))
            .header("Prefer", PREFER_MINIMAL);
        Self::send(table, Self::with_filters(builder, filters))
            .await
            .map(|_| ())
    }
}
