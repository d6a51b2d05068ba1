//! Soil test request database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{BagItem, PackageType, SoilTestRequest, SoilTestStatus};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "soil_test_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<Uuid>,
    pub crop: String,
    pub farm_area: f64,
    pub survey_number: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub contact: Option<String>,
    pub package_type: String,
    pub package_price: Option<f64>,
    /// `[{name, quantity}]`
    #[sea_orm(column_type = "JsonBinary")]
    pub bag_items: Json,
    pub total_bags: Option<i32>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SoilTestRequest {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let package_type = PackageType::parse(&model.package_type).ok_or_else(|| {
            AppError::internal(format!("Unknown package type '{}'", model.package_type))
        })?;
        let status = SoilTestStatus::parse(&model.status)
            .ok_or_else(|| AppError::internal(format!("Unknown status '{}'", model.status)))?;
        let bag_items: Vec<BagItem> = serde_json::from_value(model.bag_items)
            .map_err(|e| AppError::internal(format!("Malformed bag items: {}", e)))?;

        Ok(SoilTestRequest {
            id: model.id,
            user_id: model.user_id,
            crop: model.crop,
            farm_area: model.farm_area,
            survey_number: model.survey_number,
            address_line: model.address_line,
            city: model.city,
            state: model.state,
            pincode: model.pincode,
            contact: model.contact,
            package_type,
            package_price: model.package_price,
            bag_items,
            total_bags: model.total_bags,
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
