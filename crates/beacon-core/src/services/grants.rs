//! Grant application intake and review

use crate::error::Result;
use crate::services::traits::GrantStore;
use crate::services::validation::{normalize_email, optional_text, require_text};
use beacon_types::{GrantApplication, GrantStatus, NewGrantApplication};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

pub struct GrantService {
    store: Arc<dyn GrantStore>,
}

impl GrantService {
    pub fn new(store: Arc<dyn GrantStore>) -> Self {
        Self { store }
    }

    /// Validate and store a public application; new applications start pending
    pub async fn submit(&self, application: &NewGrantApplication) -> Result<GrantApplication> {
        let cleaned = NewGrantApplication {
            child_name: require_text("child_name", &application.child_name)?.to_string(),
            parent_name: require_text("parent_name", &application.parent_name)?.to_string(),
            email: normalize_email(&application.email)?,
            phone: optional_text(application.phone.as_deref()),
            additional_notes: optional_text(application.additional_notes.as_deref()),
        };

        let stored = self.store.insert_application(&cleaned).await?;
        info!("Grant application {} received from {}", stored.id, stored.email);
        Ok(stored)
    }

    pub async fn list(&self, status: Option<GrantStatus>) -> Result<Vec<GrantApplication>> {
        self.store.list_applications(status).await
    }

    pub async fn set_status(&self, id: Uuid, status: GrantStatus) -> Result<GrantApplication> {
        info!("Grant application {} -> {}", id, status);
        self.store.update_status(id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BeaconError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryGrants {
        rows: Mutex<Vec<GrantApplication>>,
    }

    #[async_trait]
    impl GrantStore for MemoryGrants {
        async fn insert_application(&self, application: &NewGrantApplication) -> Result<GrantApplication> {
            let row = GrantApplication {
                id: Uuid::new_v4(),
                child_name: application.child_name.clone(),
                email: application.email.clone(),
                phone: application.phone.clone(),
                parent_name: application.parent_name.clone(),
                additional_notes: application.additional_notes.clone(),
                status: GrantStatus::Pending,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn list_applications(&self, status: Option<GrantStatus>) -> Result<Vec<GrantApplication>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|a| status.map_or(true, |s| a.status == s))
                .cloned()
                .collect())
        }

        async fn update_status(&self, id: Uuid, status: GrantStatus) -> Result<GrantApplication> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| BeaconError::NotFound(format!("grant application {}", id)))?;
            row.status = status;
            Ok(row.clone())
        }
    }

    fn application() -> NewGrantApplication {
        NewGrantApplication {
            child_name: " Mia ".to_string(),
            email: "Parent@Example.org".to_string(),
            phone: Some("".to_string()),
            parent_name: "Sam Rivera".to_string(),
            additional_notes: Some("Needs a wheelchair ramp".to_string()),
        }
    }

    #[tokio::test]
    async fn submission_is_cleaned_and_pending() {
        let service = GrantService::new(Arc::new(MemoryGrants::default()));

        let stored = service.submit(&application()).await.unwrap();

        assert_eq!(stored.child_name, "Mia");
        assert_eq!(stored.email, "parent@example.org");
        assert_eq!(stored.phone, None);
        assert_eq!(stored.status, GrantStatus::Pending);
    }

    #[tokio::test]
    async fn missing_parent_name_is_rejected() {
        let store = Arc::new(MemoryGrants::default());
        let service = GrantService::new(store.clone());
        let mut bad = application();
        bad.parent_name = "   ".to_string();

        assert!(matches!(service.submit(&bad).await, Err(BeaconError::Validation(_))));
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_filter_and_update() {
        let service = GrantService::new(Arc::new(MemoryGrants::default()));
        let first = service.submit(&application()).await.unwrap();
        service.submit(&application()).await.unwrap();

        service.set_status(first.id, GrantStatus::Granted).await.unwrap();

        assert_eq!(service.list(Some(GrantStatus::Granted)).await.unwrap().len(), 1);
        assert_eq!(service.list(Some(GrantStatus::Pending)).await.unwrap().len(), 1);
        assert_eq!(service.list(None).await.unwrap().len(), 2);
        assert!(matches!(
            service.set_status(Uuid::new_v4(), GrantStatus::Rejected).await,
            Err(BeaconError::NotFound(_))
        ));
    }
}
