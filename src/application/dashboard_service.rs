// Dashboard service - Use cases for loading, editing and saving dashboards
use crate::application::object_store::{find_pages, FindQuery, ObjectStore, DEFAULT_MAX_PAGES, DEFAULT_PER_PAGE};
use crate::domain::dashboard::{Dashboard, DASHBOARD_TYPE};
use crate::domain::error::DashboardResult;
use anyhow::Context;
use futures::TryStreamExt;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn ObjectStore>,
    per_page: usize,
    max_pages: usize,
}

impl DashboardService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_paging(mut self, per_page: usize, max_pages: usize) -> Self {
        self.per_page = per_page;
        self.max_pages = max_pages;
        self
    }

    pub async fn get(&self, space: Option<&str>, id: &str) -> anyhow::Result<Dashboard> {
        let object = self
            .store
            .get(space, DASHBOARD_TYPE, id)
            .await
            .with_context(|| format!("Failed to fetch dashboard {}", id))?;

        Ok(Dashboard::try_from(object)?)
    }

    pub async fn create(&self, space: Option<&str>, dashboard: &Dashboard, overwrite: bool) -> anyhow::Result<Dashboard> {
        let object = dashboard.to_saved_object()?;
        let created = self
            .store
            .create(space, &object, overwrite)
            .await
            .with_context(|| format!("Failed to create dashboard {}", dashboard.attributes.title))?;

        tracing::info!("created dashboard {:?}", created.id);
        Ok(Dashboard::try_from(created)?)
    }

    /// Writes the dashboard's attributes and references back to the store.
    pub async fn save(&self, space: Option<&str>, dashboard: &Dashboard) -> anyhow::Result<Dashboard> {
        let id = dashboard
            .id
            .as_deref()
            .context("Cannot save a dashboard without an id")?;

        let object = dashboard.to_saved_object()?;
        let updated = self
            .store
            .update(space, &object)
            .await
            .with_context(|| format!("Failed to update dashboard {}", id))?;

        Ok(Dashboard::try_from(updated)?)
    }

    pub async fn delete(&self, space: Option<&str>, id: &str) -> anyhow::Result<()> {
        self.store
            .delete(space, DASHBOARD_TYPE, id)
            .await
            .with_context(|| format!("Failed to delete dashboard {}", id))
    }

    /// Fetches a dashboard, applies `edit` and saves the result. Nothing is
    /// written when `edit` fails.
    pub async fn edit<F>(&self, space: Option<&str>, id: &str, edit: F) -> anyhow::Result<Dashboard>
    where
        F: FnOnce(&mut Dashboard) -> DashboardResult<()>,
    {
        let mut dashboard = self.get(space, id).await?;
        edit(&mut dashboard).with_context(|| format!("Failed to edit dashboard {}", id))?;
        self.save(space, &dashboard).await
    }

    /// All dashboards of a space, optionally narrowed by a title search.
    pub async fn list(&self, space: Option<&str>, search: Option<&str>) -> anyhow::Result<Vec<Dashboard>> {
        let mut query = FindQuery::of_kind(DASHBOARD_TYPE).with_per_page(self.per_page);
        query.search = search.map(str::to_string);

        let pages: Vec<_> = find_pages(self.store.clone(), space.map(str::to_string), query, self.max_pages)
            .try_collect()
            .await
            .context("Failed to list dashboards")?;

        let mut dashboards = Vec::new();
        for object in pages.into_iter().flat_map(|page| page.saved_objects) {
            match Dashboard::try_from(object) {
                Ok(dashboard) => dashboards.push(dashboard),
                Err(e) => tracing::warn!("skipping unreadable dashboard: {}", e),
            }
        }

        tracing::debug!("listed {} dashboards", dashboards.len());
        Ok(dashboards)
    }
}
