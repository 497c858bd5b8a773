// In-memory object store, used offline and in tests
use crate::application::object_store::{FindQuery, FindResponse, ObjectStore, StoreError, StoreResult, DEFAULT_SPACE};
use crate::domain::saved_object::SavedObject;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

type ObjectKey = (String, String, String);

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectKey, SavedObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

fn key(space: Option<&str>, kind: &str, id: &str) -> ObjectKey {
    (
        space.unwrap_or(DEFAULT_SPACE).to_string(),
        kind.to_string(),
        id.to_string(),
    )
}

fn require_id(object: &SavedObject) -> StoreResult<&str> {
    object
        .id
        .as_deref()
        .ok_or_else(|| StoreError::InvalidArgument(format!("{} object has no id", object.kind)))
}

fn matches_search(object: &SavedObject, search: Option<&str>) -> bool {
    let Some(search) = search else {
        return true;
    };
    let needle = search.trim_end_matches('*').to_lowercase();
    object
        .title()
        .map(|title| title.to_lowercase().contains(&needle))
        .unwrap_or(false)
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<SavedObject> {
        self.objects
            .read()
            .await
            .get(&key(space, kind, id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    async fn create(&self, space: Option<&str>, object: &SavedObject, overwrite: bool) -> StoreResult<SavedObject> {
        let mut stored = object.clone();
        let id = stored.id.get_or_insert_with(|| Uuid::new_v4().to_string()).clone();
        let object_key = key(space, &stored.kind, &id);

        let mut objects = self.objects.write().await;
        if !overwrite && objects.contains_key(&object_key) {
            return Err(StoreError::Conflict(format!("{} {} already exists", stored.kind, id)));
        }
        objects.insert(object_key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, space: Option<&str>, object: &SavedObject) -> StoreResult<SavedObject> {
        let id = require_id(object)?;
        let mut objects = self.objects.write().await;
        let existing = objects
            .get_mut(&key(space, &object.kind, id))
            .ok_or_else(|| StoreError::not_found(&object.kind, id))?;

        existing.attributes = object.attributes.clone();
        existing.references = object.references.clone();
        Ok(existing.clone())
    }

    async fn delete(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<()> {
        self.objects
            .write()
            .await
            .remove(&key(space, kind, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    async fn find(&self, space: Option<&str>, query: &FindQuery) -> StoreResult<FindResponse> {
        if query.page == 0 || query.per_page == 0 {
            return Err(StoreError::BadRequest("page and per_page start at 1".to_string()));
        }

        let space = space.unwrap_or(DEFAULT_SPACE);
        let objects = self.objects.read().await;
        let matching: Vec<&SavedObject> = objects
            .iter()
            .filter(|((s, kind, _), _)| s == space && query.kind.as_deref().is_none_or(|k| k == kind))
            .map(|(_, object)| object)
            .filter(|object| matches_search(object, query.search.as_deref()))
            .collect();

        let saved_objects = matching
            .iter()
            .skip((query.page - 1) * query.per_page)
            .take(query.per_page)
            .map(|object| (*object).clone())
            .collect();

        Ok(FindResponse {
            page: query.page,
            per_page: query.per_page,
            total: matching.len(),
            saved_objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(kind: &str, id: &str, title: &str) -> SavedObject {
        let mut object = SavedObject::new(kind, Some(id.to_string()));
        object.attributes.insert("title".to_string(), title.into());
        object
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let store = InMemoryObjectStore::new();
        let created = store.create(None, &SavedObject::new("dashboard", None), false).await.unwrap();
        let id = created.id.unwrap();
        assert!(store.get(None, "dashboard", &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_conflicts_without_overwrite() {
        let store = InMemoryObjectStore::new();
        store.create(None, &titled("dashboard", "d1", "One"), false).await.unwrap();

        let err = store.create(None, &titled("dashboard", "d1", "Two"), false).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store.create(None, &titled("dashboard", "d1", "Two"), true).await.unwrap();
        let stored = store.get(None, "dashboard", "d1").await.unwrap();
        assert_eq!(stored.title(), Some("Two"));
    }

    #[tokio::test]
    async fn test_spaces_are_isolated() {
        let store = InMemoryObjectStore::new();
        store.create(Some("ops"), &titled("dashboard", "d1", "Ops"), false).await.unwrap();

        assert!(store.get(Some("ops"), "dashboard", "d1").await.is_ok());
        assert!(matches!(
            store.get(None, "dashboard", "d1").await,
            Err(StoreError::NotFound { .. })
        ));
        // the default space can be named explicitly
        store.create(None, &titled("dashboard", "d2", "Main"), false).await.unwrap();
        assert!(store.get(Some("default"), "dashboard", "d2").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryObjectStore::new();
        let err = store.update(None, &titled("dashboard", "d1", "One")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        store.create(None, &titled("dashboard", "d1", "One"), false).await.unwrap();
        store.update(None, &titled("dashboard", "d1", "Renamed")).await.unwrap();
        assert_eq!(store.get(None, "dashboard", "d1").await.unwrap().title(), Some("Renamed"));

        store.delete(None, "dashboard", "d1").await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.delete(None, "dashboard", "d1").await.is_err());
    }

    #[tokio::test]
    async fn test_find_filters_by_kind_and_search() {
        let store = InMemoryObjectStore::new();
        store.create(None, &titled("dashboard", "d1", "Web traffic"), false).await.unwrap();
        store.create(None, &titled("dashboard", "d2", "Errors"), false).await.unwrap();
        store.create(None, &titled("visualization", "v1", "Web hits"), false).await.unwrap();

        let found = store
            .find(None, &FindQuery::of_kind("dashboard").with_search("web*"))
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.saved_objects[0].id.as_deref(), Some("d1"));

        let all = store.find(None, &FindQuery::default()).await.unwrap();
        assert_eq!(all.total, 3);
    }
}
