//! Soil testing service - request intake and status tracking.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{NewSoilTestRequest, SoilTestRequest, SoilTestStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Email, Mailer, SoilTestRepository};

const ENTITY: &str = "Soil test request";

#[async_trait]
pub trait SoilTestService: Send + Sync {
    async fn create(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest>;

    /// Forward the request to store support by e-mail, then store it
    async fn send_to_support(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest>;

    async fn list(&self) -> AppResult<Vec<SoilTestRequest>>;

    async fn get(&self, id: i32) -> AppResult<SoilTestRequest>;

    async fn update_status(&self, id: i32, status: SoilTestStatus) -> AppResult<SoilTestRequest>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct SoilTestManager {
    requests: Arc<dyn SoilTestRepository>,
    mailer: Arc<dyn Mailer>,
    support_email: String,
}

impl SoilTestManager {
    pub fn new(
        requests: Arc<dyn SoilTestRepository>,
        mailer: Arc<dyn Mailer>,
        support_email: impl Into<String>,
    ) -> Self {
        Self {
            requests,
            mailer,
            support_email: support_email.into(),
        }
    }
}

#[async_trait]
impl SoilTestService for SoilTestManager {
    async fn create(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest> {
        let stored = self.requests.create(request).await?;
        tracing::info!(request_id = stored.id, crop = %stored.crop, "Soil test request created");
        Ok(stored)
    }

    async fn send_to_support(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest> {
        let email = Email::text(
            &self.support_email,
            request.support_subject(),
            request.support_body(Utc::now()),
        );
        if let Err(e) = self.mailer.send(email).await {
            tracing::error!(error = %e, "Failed to e-mail store support, storing request anyway");
        }

        self.create(request).await
    }

    async fn list(&self) -> AppResult<Vec<SoilTestRequest>> {
        self.requests.list().await
    }

    async fn get(&self, id: i32) -> AppResult<SoilTestRequest> {
        self.requests.find_by_id(id).await?.ok_or_not_found(ENTITY)
    }

    async fn update_status(&self, id: i32, status: SoilTestStatus) -> AppResult<SoilTestRequest> {
        let updated = self
            .requests
            .update_status(id, status)
            .await?
            .ok_or_not_found(ENTITY)?;

        tracing::info!(request_id = id, status = status.as_str(), "Soil test status updated");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.requests.delete(id).await? {
            return Err(AppError::not_found(ENTITY));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BagItem, PackageType};
    use crate::infra::{MockMailer, MockSoilTestRepository};
    use mockall::predicate::eq;

    fn new_request() -> NewSoilTestRequest {
        NewSoilTestRequest {
            user_id: None,
            crop: "Cotton".to_string(),
            farm_area: 4.0,
            survey_number: "SN-42".to_string(),
            address_line: "Near old well".to_string(),
            city: "Bathinda".to_string(),
            state: "Punjab".to_string(),
            pincode: "151001".to_string(),
            contact: Some("9876543210".to_string()),
            package_type: PackageType::InStore,
            package_price: None,
            bag_items: vec![BagItem {
                name: "Topsoil".to_string(),
                quantity: 1,
            }],
            total_bags: Some(1),
        }
    }

    fn stored(id: i32, new: NewSoilTestRequest) -> SoilTestRequest {
        let now = Utc::now();
        SoilTestRequest {
            id,
            user_id: new.user_id,
            crop: new.crop,
            farm_area: new.farm_area,
            survey_number: new.survey_number,
            address_line: new.address_line,
            city: new.city,
            state: new.state,
            pincode: new.pincode,
            contact: new.contact,
            package_type: new.package_type,
            package_price: new.package_price,
            bag_items: new.bag_items,
            total_bags: new.total_bags,
            status: SoilTestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_send_to_support_stores_even_if_mail_fails() {
        let mut repo = MockSoilTestRepository::new();
        repo.expect_create().times(1).returning(|new| Ok(stored(7, new)));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| {
                email.to == "support@agriproxy.com"
                    && email.subject == "New Soil Testing Request - Cotton (4 acres)"
                    && !email.html
            })
            .returning(|_| Err(AppError::internal("smtp down")));

        let service = SoilTestManager::new(Arc::new(repo), Arc::new(mailer), "support@agriproxy.com");
        let stored = service.send_to_support(new_request()).await.unwrap();

        assert_eq!(stored.id, 7);
        assert_eq!(stored.status, SoilTestStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_request() {
        let mut repo = MockSoilTestRepository::new();
        repo.expect_find_by_id().with(eq(99)).returning(|_| Ok(None));
        repo.expect_update_status().returning(|_, _| Ok(None));
        repo.expect_delete().returning(|_| Ok(false));

        let service = SoilTestManager::new(Arc::new(repo), Arc::new(MockMailer::new()), "s@x.com");

        let err = service.get(99).await.unwrap_err();
        assert_eq!(err.to_string(), "Soil test request not found");
        assert!(matches!(
            service.update_status(99, SoilTestStatus::Completed).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status() {
        let mut repo = MockSoilTestRepository::new();
        repo.expect_update_status()
            .with(eq(3), eq(SoilTestStatus::InProgress))
            .returning(|id, status| {
                let mut r = stored(id, new_request());
                r.status = status;
                Ok(Some(r))
            });

        let service = SoilTestManager::new(Arc::new(repo), Arc::new(MockMailer::new()), "s@x.com");
        let updated = service.update_status(3, SoilTestStatus::InProgress).await.unwrap();
        assert_eq!(updated.status, SoilTestStatus::InProgress);
    }
}
