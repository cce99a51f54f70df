//! Collection queries: one optional filter and one optional sort key.

use std::cmp::Ordering;

use super::{CollectionPath, Document, FieldValue, StoreError};

/// Maximum number of ids accepted by an [`Filter::IdIn`] filter.
pub const MAX_IN_VALUES: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches documents whose id is one of the given ids.
    IdIn(Vec<String>),
    /// Matches documents whose field equals the value.
    FieldEquals(String, FieldValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: CollectionPath,
    filter: Option<Filter>,
    order_by: Option<(String, Direction)>,
}

impl Query {
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filter: None,
            order_by: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Rejects queries the store refuses to run.
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(Filter::IdIn(ids)) = &self.filter {
            if ids.is_empty() {
                return Err(StoreError::InvalidQuery(
                    "'in' filter needs at least one id".to_string(),
                ));
            }
            if ids.len() > MAX_IN_VALUES {
                return Err(StoreError::InvalidQuery(format!(
                    "'in' filter accepts at most {} ids, got {}",
                    MAX_IN_VALUES,
                    ids.len()
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match &self.filter {
            None => true,
            Some(Filter::IdIn(ids)) => ids.iter().any(|id| *id == doc.id),
            Some(Filter::FieldEquals(field, value)) => doc.get(field) == Some(value),
        }
    }

    /// Filters and sorts a collection's documents into the query result.
    ///
    /// Documents lacking the sort field go last. Ties fall back to document id.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        match &self.order_by {
            Some((field, direction)) => result.sort_by(|a, b| {
                let ordering = match (a.get(field), b.get(field)) {
                    (Some(x), Some(y)) => {
                        let ord = x.sort_cmp(y);
                        match direction {
                            Direction::Ascending => ord,
                            Direction::Descending => ord.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                ordering.then_with(|| a.id.cmp(&b.id))
            }),
            None => result.sort_by(|a, b| a.id.cmp(&b.id)),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Fields;
    use chrono::{Duration, Utc};

    fn doc(id: &str, field: Option<(&str, FieldValue)>) -> Document {
        let mut fields = Fields::new();
        if let Some((name, value)) = field {
            fields.insert(name.to_string(), value);
        }
        Document::new(id, fields)
    }

    #[test]
    fn test_order_newest_first() {
        let now = Utc::now();
        let docs = vec![
            doc("a", Some(("timestamp", (now - Duration::seconds(10)).into()))),
            doc("b", Some(("timestamp", now.into()))),
            doc("c", None),
        ];

        let query = Query::new(CollectionPath::recipes()).order_by("timestamp", Direction::Descending);
        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let docs = vec![
            doc("z", Some(("n", FieldValue::Int(1)))),
            doc("a", Some(("n", FieldValue::Int(1)))),
        ];
        let query = Query::new(CollectionPath::recipes()).order_by("n", Direction::Ascending);
        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_mixed_kinds_sort_by_kind() {
        let docs = vec![
            doc("s", Some(("n", "ten".into()))),
            doc("i", Some(("n", FieldValue::Int(3)))),
            doc("b", Some(("n", FieldValue::Bool(true)))),
            doc("f", Some(("n", FieldValue::Float(2.5)))),
            doc("x", Some(("n", FieldValue::Float(f64::NAN)))),
        ];
        let query = Query::new(CollectionPath::recipes()).order_by("n", Direction::Ascending);
        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "f", "i", "x", "s"]);
    }

    #[test]
    fn test_id_in_filter() {
        let docs = vec![doc("a", None), doc("b", None), doc("c", None)];
        let query = Query::new(CollectionPath::recipes())
            .filter(Filter::IdIn(vec!["c".into(), "a".into(), "x".into()]));
        let ids: Vec<String> = query.apply(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_field_equals_filter() {
        let docs = vec![
            doc("a", Some(("title", "Soup".into()))),
            doc("b", Some(("title", "Salad".into()))),
        ];
        let query = Query::new(CollectionPath::recipes())
            .filter(Filter::FieldEquals("title".into(), "Soup".into()));
        let result = query.apply(docs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn test_validate_in_limits() {
        let too_many: Vec<String> = (0..=MAX_IN_VALUES).map(|i| format!("r{}", i)).collect();
        let query = Query::new(CollectionPath::recipes()).filter(Filter::IdIn(too_many));
        assert!(matches!(query.validate(), Err(StoreError::InvalidQuery(_))));

        let empty = Query::new(CollectionPath::recipes()).filter(Filter::IdIn(Vec::new()));
        assert!(empty.validate().is_err());

        let ok = Query::new(CollectionPath::recipes()).filter(Filter::IdIn(vec!["a".into()]));
        assert!(ok.validate().is_ok());
    }
}
