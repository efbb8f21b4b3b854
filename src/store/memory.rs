//! In-process `DocumentStore` backend. Holds every document in a single
//! path-keyed map behind an async lock; the reference backend for tests and
//! local development, while deployments bind a managed document database to
//! the same trait.

use super::{CollectionPath, DocPath, Document, DocumentStore, Query, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, doc: &DocPath) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.get(doc.as_str()).cloned())
    }

    async fn set(&self, doc: &DocPath, data: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.insert(doc.as_str().to_string(), data);
        Ok(())
    }

    async fn merge(&self, doc: &DocPath, data: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let existing = docs
            .get_mut(doc.as_str())
            .ok_or_else(|| StoreError::NotFound(doc.clone()))?;
        for (key, value) in data {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, doc: &DocPath) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.remove(doc.as_str());
        Ok(())
    }

    async fn add(&self, collection: &CollectionPath, data: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut docs = self.docs.write().await;
        docs.insert(collection.doc(&id).as_str().to_string(), data);
        Ok(id)
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: Query,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let prefix = format!("{}/", collection.as_str());
        let docs = self.docs.read().await;

        let mut rows: Vec<(String, Document)> = docs
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            // Direct children only; deeper sub-collections are not part of
            // this collection.
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .filter(|(_, doc)| match &query.filter {
                Some((field, value)) => doc.get(field) == Some(value),
                None => true,
            })
            .map(|(path, doc)| (path[prefix.len()..].to_string(), doc.clone()))
            .collect();

        // Stable sort: ties keep path order, so results stay deterministic.
        rows.sort_by(|(_, a), (_, b)| field_ord(a.get(&query.order_by), b.get(&query.order_by)));

        Ok(rows
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

fn field_ord(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{patient_doc, patients_collection, provider_doc};
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let store = MemoryStore::new();
        let path = provider_doc("p1");
        store
            .set(&path, doc(&[("name", json!("Dr. Kim"))]))
            .await
            .unwrap();

        let fetched = store.get(&path).await.unwrap().unwrap();
        assert_eq!(fetched.get("name"), Some(&json!("Dr. Kim")));
        assert!(store.get(&provider_doc("p2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_updates_only_given_fields() {
        let store = MemoryStore::new();
        let path = provider_doc("p1");
        store
            .set(
                &path,
                doc(&[("name", json!("Dr. Kim")), ("email", json!("k@x.co"))]),
            )
            .await
            .unwrap();

        store
            .merge(&path, doc(&[("email", json!("kim@clinic.org"))]))
            .await
            .unwrap();

        let fetched = store.get(&path).await.unwrap().unwrap();
        assert_eq!(fetched.get("name"), Some(&json!("Dr. Kim")));
        assert_eq!(fetched.get("email"), Some(&json!("kim@clinic.org")));
    }

    #[tokio::test]
    async fn merge_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .merge(&provider_doc("ghost"), doc(&[("name", json!("x"))]))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let path = patient_doc("p1", "a");
        store.set(&path, doc(&[("lastName", json!("A"))])).await.unwrap();

        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
        // Second delete of the same path still succeeds
        store.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn add_generates_distinct_ids() {
        let store = MemoryStore::new();
        let coll = patients_collection("p1");
        let a = store.add(&coll, doc(&[("lastName", json!("A"))])).await.unwrap();
        let b = store.add(&coll, doc(&[("lastName", json!("B"))])).await.unwrap();
        assert_ne!(a, b);
        assert!(store.get(&coll.doc(&a)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn query_filters_orders_and_paginates() {
        let store = MemoryStore::new();
        let coll = patients_collection("p1");
        for (last, status) in [
            ("Nguyen", "ACTIVE"),
            ("Abbott", "ACTIVE"),
            ("Mills", "CHURNED"),
        ] {
            store
                .add(
                    &coll,
                    doc(&[("lastName", json!(last)), ("status", json!(status))]),
                )
                .await
                .unwrap();
        }

        let rows = store
            .query(&coll, Query::order_by("lastName"))
            .await
            .unwrap();
        let names: Vec<_> = rows
            .iter()
            .map(|(_, d)| d.get("lastName").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, ["Abbott", "Mills", "Nguyen"]);

        let active = store
            .query(
                &coll,
                Query::order_by("lastName").filter("status", "ACTIVE"),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 2);

        let page = store
            .query(&coll, Query::order_by("lastName").limit(1).offset(1))
            .await
            .unwrap();
        assert_eq!(
            page[0].1.get("lastName").unwrap().as_str().unwrap(),
            "Mills"
        );
    }

    #[tokio::test]
    async fn query_ignores_sibling_providers_and_nested_docs() {
        let store = MemoryStore::new();
        store
            .add(&patients_collection("p1"), doc(&[("lastName", json!("A"))]))
            .await
            .unwrap();
        store
            .add(&patients_collection("p2"), doc(&[("lastName", json!("B"))]))
            .await
            .unwrap();

        let rows = store
            .query(&patients_collection("p1"), Query::order_by("lastName"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
