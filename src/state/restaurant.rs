use super::AppState;
use crate::error::AppError;
use crate::types::*;

impl AppState {
    /// Add a restaurant to the end of the list
    pub async fn add_restaurant(
        &self,
        session_id: &str,
        name: &str,
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "add restaurants")?;

        let added = doc.add_restaurant(name)?;
        tracing::info!(id = %added.id, name = %added.name, "Restaurant added");
        self.save(doc).await
    }

    pub async fn remove_restaurant(
        &self,
        session_id: &str,
        id: &str,
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "remove restaurants")?;

        let removed = doc
            .remove_restaurant(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        tracing::info!(id = %removed.id, name = %removed.name, "Restaurant removed");
        self.save(doc).await
    }

    pub async fn toggle_blacklist(
        &self,
        session_id: &str,
        id: &str,
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "toggle exclusions")?;

        let blacklisted = doc
            .toggle_blacklist(id)
            .map(|r| r.blacklisted)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        tracing::info!(id, blacklisted, "Restaurant exclusion toggled");
        self.save(doc).await
    }

    pub async fn reset_cooldown(
        &self,
        session_id: &str,
        id: &str,
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "reset cooldowns")?;

        doc.reset_cooldown(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        tracing::info!(id, "Restaurant cooldown reset");
        self.save(doc).await
    }

    /// Remove every listed restaurant. Unknown ids are ignored.
    pub async fn bulk_delete(
        &self,
        session_id: &str,
        ids: &[RestaurantId],
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "delete restaurants")?;

        let removed = doc.bulk_delete(ids);
        tracing::info!(requested = ids.len(), removed, "Bulk delete");
        self.save(doc).await
    }

    pub async fn set_cooldown_weeks(
        &self,
        session_id: &str,
        weeks: f64,
    ) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        Self::require_activator(&doc, session_id, "change the cooldown")?;

        doc.set_cooldown_weeks(weeks)?;
        tracing::info!(cooldown_weeks = weeks, "Cooldown changed");
        self.save(doc).await
    }
}
