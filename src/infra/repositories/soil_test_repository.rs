//! Soil test request repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, QueryOrder, Set};

use super::entities::soil_test_request::{self, ActiveModel, Entity as SoilTestEntity};
use crate::domain::{NewSoilTestRequest, SoilTestRequest, SoilTestStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SoilTestRepository: Send + Sync {
    /// Store a request in `pending` state; the id is assigned by the store
    async fn create(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest>;

    /// All requests, oldest first
    async fn list(&self) -> AppResult<Vec<SoilTestRequest>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<SoilTestRequest>>;

    /// Returns None when no request has this id
    async fn update_status(
        &self,
        id: i32,
        status: SoilTestStatus,
    ) -> AppResult<Option<SoilTestRequest>>;

    /// Returns false when nothing matched
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

pub struct SoilTestStore {
    db: DatabaseConnection,
}

impl SoilTestStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SoilTestRepository for SoilTestStore {
    async fn create(&self, request: NewSoilTestRequest) -> AppResult<SoilTestRequest> {
        let now = Utc::now();
        let bag_items = serde_json::to_value(&request.bag_items)
            .map_err(|e| AppError::internal(format!("Failed to encode bag items: {}", e)))?;

        let active_model = ActiveModel {
            id: NotSet,
            user_id: Set(request.user_id),
            crop: Set(request.crop),
            farm_area: Set(request.farm_area),
            survey_number: Set(request.survey_number),
            address_line: Set(request.address_line),
            city: Set(request.city),
            state: Set(request.state),
            pincode: Set(request.pincode),
            contact: Set(request.contact),
            package_type: Set(request.package_type.as_str().to_string()),
            package_price: Set(request.package_price),
            bag_items: Set(bag_items),
            total_bags: Set(request.total_bags),
            status: Set(SoilTestStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        SoilTestRequest::try_from(model)
    }

    async fn list(&self) -> AppResult<Vec<SoilTestRequest>> {
        SoilTestEntity::find()
            .order_by_asc(soil_test_request::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(SoilTestRequest::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<SoilTestRequest>> {
        SoilTestEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(SoilTestRequest::try_from)
            .transpose()
    }

    async fn update_status(
        &self,
        id: i32,
        status: SoilTestStatus,
    ) -> AppResult<Option<SoilTestRequest>> {
        let Some(model) = SoilTestEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        SoilTestRequest::try_from(model).map(Some)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = SoilTestEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
