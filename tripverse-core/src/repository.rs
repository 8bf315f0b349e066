use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use tripverse_shared::{SearchResult, SearchType};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Remote store unreachable: {0}")]
    Transport(String),

    #[error("Malformed row in {table}: {message}")]
    Decode { table: String, message: String },

    #[error("Duplicate row in {0}")]
    Conflict(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Record source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Equality filters, an optional ordering and a row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }

    /// Evaluate the query against rows held locally.
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Table-level access to the hosted backend (or a local stand-in).
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError>;
}

/// Supplies the candidate pools a search filters.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_pool(&self, search_type: SearchType) -> Result<Vec<SearchResult>, SourceError>;

    /// One pool, or the union of all five in [`SearchType::ALL`] order.
    async fn fetch_candidates(
        &self,
        search_type: Option<SearchType>,
    ) -> Result<Vec<SearchResult>, SourceError> {
        match search_type {
            Some(search_type) => self.fetch_pool(search_type).await,
            None => {
                let mut results = Vec::new();
                for search_type in SearchType::ALL {
                    results.extend(self.fetch_pool(search_type).await?);
                }
                Ok(results)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_filters_orders_and_limits() {
        let rows = vec![
            json!({"id": "a", "rating": 4.7, "location": "Japan"}),
            json!({"id": "b", "rating": 4.9, "location": "Greece"}),
            json!({"id": "c", "rating": 4.8, "location": "Japan"}),
        ];

        let top = Query::new().order("rating", false).limit(2).apply(rows.clone());
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["id"], "b");
        assert_eq!(top[1]["id"], "c");

        let japan = Query::new().eq("location", "Japan").apply(rows);
        assert_eq!(japan.len(), 2);
        assert!(japan.iter().all(|r| r["location"] == "Japan"));
    }

    struct FixedSource;

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch_pool(&self, search_type: SearchType) -> Result<Vec<SearchResult>, SourceError> {
            Ok(vec![SearchResult::new(
                search_type.as_str(),
                search_type.result_kind(),
                search_type.as_str(),
            )])
        }
    }

    #[tokio::test]
    async fn test_candidates_without_type_are_union_in_order() {
        let all = FixedSource.fetch_candidates(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hotels", "flights", "packages", "destinations", "guides"]);

        let one = FixedSource.fetch_candidates(Some(SearchType::Guides)).await.unwrap();
        assert_eq!(one.len(), 1);
    }
}
