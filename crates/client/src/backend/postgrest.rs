//! REST-over-Postgres query builder.
//!
//! Filters render as `column=op.value` query parameters, ordering as
//! `order=column.asc|desc`. Embedded joins are part of the `select` column
//! list, e.g. `*, product:products(*)`.

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{BackendClient, BackendError};

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A query against one table.
///
/// Built with chained calls, executed by one of the terminal methods
/// (`select_all`, `single`, `insert`, `update`, `delete`). Every terminal
/// method issues exactly one HTTP request.
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until executed"]
pub struct Query<'a> {
    client: &'a BackendClient,
    table: String,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl<'a> Query<'a> {
    pub(super) fn new(client: &'a BackendClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Columns to return, including embedded joins.
    pub fn select(mut self, columns: &str) -> Self {
        // Whitespace is insignificant to the server; strip it so URLs stay stable
        self.columns = Some(columns.chars().filter(|c| !c.is_whitespace()).collect());
        self
    }

    /// `column = value`
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    /// `column <> value`
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    /// Case-insensitive substring match. Wildcards in `needle` are stripped.
    pub fn ilike(self, column: &str, needle: &str) -> Self {
        let needle: String = needle.chars().filter(|c| !matches!(c, '*' | '%')).collect();
        self.filter(column, "ilike", format!("*{needle}*"))
    }

    /// `column IS NULL`
    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    /// `column IN (values...)`
    pub fn in_list<T: Display>(self, column: &str, values: &[T]) -> Self {
        let list = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({list})"))
    }

    /// Add an ordering clause; clauses apply in the order they are added.
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(format!("{column}.{}", direction.as_str()));
        self
    }

    /// Cap the number of returned rows.
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("{op}.{value}")));
        self
    }

    /// Render the request URL.
    pub(crate) fn url(&self) -> Result<Url, BackendError> {
        let mut url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = &self.columns {
                pairs.append_pair("select", columns);
            }
            for (column, condition) in &self.filters {
                pairs.append_pair(column, condition);
            }
            if !self.order.is_empty() {
                pairs.append_pair("order", &self.order.join(","));
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        // Drop a dangling `?` when no parameters were added
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    fn require_filter(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.filters.is_empty() {
            return Err(BackendError::UnfilteredMutation(
                operation,
                self.table.clone(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Terminal operations
    // =========================================================================

    /// Fetch all matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows can't be decoded.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn select_all<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        let url = self.url()?;
        let request = self.client.request(Method::GET, url).await;
        self.client.send_json(request).await
    }

    /// Fetch exactly one row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if no row matches.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn single<T: DeserializeOwned>(self) -> Result<T, BackendError> {
        let table = self.table.clone();
        let rows: Vec<T> = self.limit(1).select_all().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("no matching row in '{table}'")))
    }

    /// Insert one row or an array of rows and return the stored rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the rows.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn insert<B, T>(self, body: &B) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url()?;
        let request = self
            .client
            .request(Method::POST, url)
            .await
            .header("Prefer", "return=representation")
            .json(body);
        self.client.send_json(request).await
    }

    /// Patch every matching row and return the updated rows.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnfilteredMutation` when no filter was given.
    #[instrument(skip(self, body), fields(table = %self.table))]
    pub async fn update<B, T>(self, body: &B) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.require_filter("update")?;
        let url = self.url()?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .await
            .header("Prefer", "return=representation")
            .json(body);
        self.client.send_json(request).await
    }

    /// Delete every matching row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnfilteredMutation` when no filter was given.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(self) -> Result<(), BackendError> {
        self.require_filter("delete")?;
        let url = self.url()?;
        let request = self.client.request(Method::DELETE, url).await;
        self.client.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::BackendConfig;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse("https://abc.supabase.co").expect("valid url"),
            anon_key: SecretString::from("anon".to_string()),
        })
    }

    fn params(query: &Query<'_>) -> Vec<(String, String)> {
        query
            .url()
            .expect("url")
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_plain_table_url() {
        let client = client();
        let url = client.from("categories").url().expect("url");
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/categories");
    }

    #[test]
    fn test_filters_order_and_limit() {
        let client = client();
        let query = client
            .from("products")
            .select("*, category:categories(name)")
            .eq("category_id", 3)
            .neq("is_available", false)
            .order("created_at", Direction::Descending)
            .order("name", Direction::Ascending)
            .limit(20);

        assert_eq!(
            params(&query),
            vec![
                ("select".into(), "*,category:categories(name)".into()),
                ("category_id".into(), "eq.3".into()),
                ("is_available".into(), "neq.false".into()),
                ("order".into(), "created_at.desc,name.asc".into()),
                ("limit".into(), "20".into()),
            ]
        );
    }

    #[test]
    fn test_ilike_strips_wildcards() {
        let client = client();
        let query = client.from("products").ilike("name", "la*tt%e");
        assert_eq!(
            params(&query),
            vec![("name".into(), "ilike.*latte*".into())]
        );
    }

    #[test]
    fn test_in_list_and_is_null() {
        let client = client();
        let query = client
            .from("orders")
            .in_list("id", &[1, 2, 3])
            .is_null("deleted_at");
        assert_eq!(
            params(&query),
            vec![
                ("id".into(), "in.(1,2,3)".into()),
                ("deleted_at".into(), "is.null".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unfiltered_delete_is_refused() {
        let client = client();
        let err = client.from("cart_items").delete().await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::UnfilteredMutation("delete", ref table) if table == "cart_items"
        ));
    }

    #[tokio::test]
    async fn test_unfiltered_update_is_refused() {
        let client = client();
        let err = client
            .from("profiles")
            .update::<_, serde_json::Value>(&serde_json::json!({"first_name": "Olena"}))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnfilteredMutation("update", _)));
    }
}
