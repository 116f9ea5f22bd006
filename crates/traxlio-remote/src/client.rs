use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::{RemoteConfig, Session};
use crate::error::RemoteError;
use crate::rows::Table;

/// Thin REST client for the hosted backend.
///
/// Every request carries the project key and the session's bearer token, and
/// every query is filtered by the session's `user_id`. Row-level security on
/// the backend is expected to enforce the same scoping.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    session: Session,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig, session: Session) -> Result<Self, RemoteError> {
        let trimmed = config.url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|e| RemoteError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl {
                url: config.url.clone(),
                reason: "not a base URL".into(),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            rest_url: format!("{}/rest/v1", trimmed),
            anon_key: config.anon_key.clone(),
            session,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table.name()))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.session.access_token)
    }

    fn owner_filter(&self) -> (&'static str, String) {
        ("user_id", eq(&self.session.user_id))
    }

    /// Every row of `table` owned by the session user, newest first.
    #[instrument(skip(self), fields(table = table.name()))]
    pub async fn list<R: DeserializeOwned>(&self, table: Table) -> Result<Vec<R>, RemoteError> {
        let mut query = vec![("select", "*".to_string()), self.owner_filter()];
        if let Some(column) = table.order_column() {
            query.push(("order", format!("{}.desc", column)));
        }
        if let Some(limit) = table.list_limit() {
            query.push(("limit", limit.to_string()));
        }

        let rows: Vec<R> = read_json(self.request(Method::GET, table).query(&query)).await?;
        debug!(count = rows.len(), "Listed rows");
        Ok(rows)
    }

    /// Rows of `table` whose `column` equals `value`.
    #[instrument(skip(self), fields(table = table.name()))]
    pub async fn list_where<R: DeserializeOwned>(
        &self,
        table: Table,
        column: &str,
        value: &str,
    ) -> Result<Vec<R>, RemoteError> {
        let query = [
            ("select", "*".to_string()),
            (column, eq(value)),
            self.owner_filter(),
        ];
        read_json(self.request(Method::GET, table).query(&query)).await
    }

    pub async fn find<R: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
    ) -> Result<Option<R>, RemoteError> {
        let query = [
            ("select", "*".to_string()),
            ("id", eq(id)),
            self.owner_filter(),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<R> = read_json(self.request(Method::GET, table).query(&query)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored (with server-issued columns).
    #[instrument(skip(self, body), fields(table = table.name()))]
    pub async fn insert<B, R>(&self, table: Table, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let rows: Vec<R> = read_json(
            self.request(Method::POST, table)
                .header("Prefer", "return=representation")
                .json(body),
        )
        .await?;

        rows.into_iter().next().ok_or(RemoteError::EmptyInsert {
            table: table.name(),
        })
    }

    /// Insert without reading the row back.
    pub async fn insert_minimal<B>(&self, table: Table, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        expect_success(
            self.request(Method::POST, table)
                .header("Prefer", "return=minimal")
                .json(body),
        )
        .await
    }

    #[instrument(skip(self, body), fields(table = table.name()))]
    pub async fn update<B>(&self, table: Table, id: &str, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        let query = [("id", eq(id)), self.owner_filter()];
        expect_success(
            self.request(Method::PATCH, table)
                .query(&query)
                .header("Prefer", "return=minimal")
                .json(body),
        )
        .await
    }

    #[instrument(skip(self), fields(table = table.name()))]
    pub async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
        let query = [("id", eq(id)), self.owner_filter()];
        expect_success(self.request(Method::DELETE, table).query(&query)).await
    }

    /// Delete every owned row whose `column` is one of `values`.
    #[instrument(skip(self, values), fields(table = table.name(), count = values.len()))]
    pub async fn delete_where(
        &self,
        table: Table,
        column: &str,
        values: &[String],
    ) -> Result<(), RemoteError> {
        if values.is_empty() {
            return Ok(());
        }
        let query = [(column, one_of(values)), self.owner_filter()];
        expect_success(self.request(Method::DELETE, table).query(&query)).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// `in.("a","b")` with values quoted so reserved characters survive.
fn one_of(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

async fn expect_success(request: RequestBuilder) -> Result<(), RemoteError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(api_error(status.as_u16(), response.text().await?))
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), body));
    }

    Ok(serde_json::from_str(&body)?)
}

fn api_error(status: u16, body: String) -> RemoteError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    RemoteError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "u1".into(),
            access_token: "token".into(),
        }
    }

    #[test]
    fn rejects_unparseable_urls() {
        let result = RemoteClient::new(&RemoteConfig::new("not a url", "anon"), session());
        assert!(matches!(result, Err(RemoteError::InvalidUrl { .. })));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let client =
            RemoteClient::new(&RemoteConfig::new("https://db.example.com/", "anon"), session())
                .unwrap();
        assert_eq!(client.rest_url, "https://db.example.com/rest/v1");
    }

    #[test]
    fn in_filter_quotes_values() {
        assert_eq!(one_of(&["a".into(), "b,c".into()]), r#"in.("a","b,c")"#);
    }

    #[test]
    fn api_error_prefers_message_field() {
        let err = api_error(409, r#"{"code":"23505","message":"duplicate key"}"#.into());
        assert_eq!(err.to_string(), "API error: 409 - duplicate key");

        let err = api_error(502, "Bad Gateway".into());
        assert_eq!(err.to_string(), "API error: 502 - Bad Gateway");
    }
}
