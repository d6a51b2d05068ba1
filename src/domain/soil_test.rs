//! Soil testing service requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Where the soil samples are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PackageType {
    #[serde(rename = "inStore")]
    InStore,
    #[serde(rename = "onFarm")]
    OnFarm,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::InStore => "inStore",
            PackageType::OnFarm => "onFarm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inStore" => Some(PackageType::InStore),
            "onFarm" => Some(PackageType::OnFarm),
            _ => None,
        }
    }
}

/// Processing state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SoilTestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl SoilTestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilTestStatus::Pending => "pending",
            SoilTestStatus::InProgress => "in_progress",
            SoilTestStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SoilTestStatus::Pending),
            "in_progress" => Some(SoilTestStatus::InProgress),
            "completed" => Some(SoilTestStatus::Completed),
            _ => None,
        }
    }
}

/// One kind of sample bag and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BagItem {
    #[schema(example = "Topsoil")]
    pub name: String,
    #[schema(example = 2, minimum = 1)]
    pub quantity: u32,
}

/// A stored soil testing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoilTestRequest {
    #[schema(example = 1)]
    pub id: i32,
    pub user_id: Option<Uuid>,
    #[schema(example = "Wheat")]
    pub crop: String,
    /// Acres
    #[schema(example = 2.5)]
    pub farm_area: f64,
    pub survey_number: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub package_type: PackageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_price: Option<f64>,
    pub bag_items: Vec<BagItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bags: Option<i32>,
    pub status: SoilTestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated request data before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSoilTestRequest {
    pub user_id: Option<Uuid>,
    pub crop: String,
    pub farm_area: f64,
    pub survey_number: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub contact: Option<String>,
    pub package_type: PackageType,
    pub package_price: Option<f64>,
    pub bag_items: Vec<BagItem>,
    pub total_bags: Option<i32>,
}

impl NewSoilTestRequest {
    /// Subject line of the store support notification.
    pub fn support_subject(&self) -> String {
        format!(
            "New Soil Testing Request - {} ({} acres)",
            self.crop, self.farm_area
        )
    }

    /// Plain-text body of the store support notification.
    pub fn support_body(&self, submitted_at: DateTime<Utc>) -> String {
        let survey = if self.survey_number.is_empty() {
            "Not provided"
        } else {
            &self.survey_number
        };
        let price = self
            .package_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "Not provided".to_string());
        let bags = self
            .total_bags
            .map(|b| b.to_string())
            .unwrap_or_else(|| "Not provided".to_string());
        let items = self
            .bag_items
            .iter()
            .map(|item| format!("- {}: {} unit(s)", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "New Soil Testing Request - AgriProxy\n\n\
             Farmer Details:\n\
             - Contact: {contact}\n\
             - Address: {address}, {city}, {state} - {pincode}\n\n\
             Farm Information:\n\
             - Crop: {crop}\n\
             - Farm Area: {area} acres\n\
             - Survey Number: {survey}\n\n\
             Package Details:\n\
             - Package Type: {package}\n\
             - Package Price: {price}\n\
             - Total Bags: {bags}\n\n\
             Bag Items:\n{items}\n\n\
             Please process this soil testing request and contact the farmer for further details.\n\n\
             ---\n\
             This request was generated automatically by AgriProxy App.\n\
             Timestamp: {timestamp}\n",
            contact = self.contact.as_deref().unwrap_or("Not provided"),
            address = self.address_line,
            city = self.city,
            state = self.state,
            pincode = self.pincode,
            crop = self.crop,
            area = self.farm_area,
            survey = survey,
            package = self.package_type.as_str(),
            price = price,
            bags = bags,
            items = items,
            timestamp = submitted_at.to_rfc3339(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewSoilTestRequest {
        NewSoilTestRequest {
            user_id: None,
            crop: "Paddy".to_string(),
            farm_area: 3.5,
            survey_number: String::new(),
            address_line: "Plot 12, Canal Road".to_string(),
            city: "Dhuri".to_string(),
            state: "Punjab".to_string(),
            pincode: "148024".to_string(),
            contact: Some("+919876543210".to_string()),
            package_type: PackageType::OnFarm,
            package_price: Some(499.0),
            bag_items: vec![
                BagItem {
                    name: "Topsoil".to_string(),
                    quantity: 2,
                },
                BagItem {
                    name: "Subsoil".to_string(),
                    quantity: 1,
                },
            ],
            total_bags: Some(3),
        }
    }

    #[test]
    fn test_status_strings() {
        for status in [
            SoilTestStatus::Pending,
            SoilTestStatus::InProgress,
            SoilTestStatus::Completed,
        ] {
            assert_eq!(SoilTestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SoilTestStatus::parse("done"), None);
        assert_eq!(
            serde_json::to_value(SoilTestStatus::InProgress).unwrap(),
            "in_progress"
        );
    }

    #[test]
    fn test_package_type_wire_names() {
        assert_eq!(serde_json::to_value(PackageType::InStore).unwrap(), "inStore");
        assert_eq!(PackageType::parse("onFarm"), Some(PackageType::OnFarm));
        assert_eq!(PackageType::parse("delivery"), None);
    }

    #[test]
    fn test_support_message() {
        let req = request();
        assert_eq!(
            req.support_subject(),
            "New Soil Testing Request - Paddy (3.5 acres)"
        );

        let body = req.support_body(Utc::now());
        assert!(body.contains("- Survey Number: Not provided"));
        assert!(body.contains("- Address: Plot 12, Canal Road, Dhuri, Punjab - 148024"));
        assert!(body.contains("- Topsoil: 2 unit(s)\n- Subsoil: 1 unit(s)"));
        assert!(body.contains("- Package Type: onFarm"));
    }
}
