//! Card issuance types

use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;

/// Kind of card being issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Employee,
    Visitor,
    Temporary,
}

impl_status_conversions!(CardType {
    Employee => "employee",
    Visitor => "visitor",
    Temporary => "temporary",
});

/// Lifecycle state of an issued card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Inactive,
    Expired,
    Suspended,
}

impl_status_conversions!(CardStatus {
    Active => "active",
    Inactive => "inactive",
    Expired => "expired",
    Suspended => "suspended",
});

/// Issued card as returned by the card endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIssue {
    pub id: String,
    pub user_id: String,
    pub card_type: CardType,
    pub card_number: String,
    pub issued_at: String,
    pub issued_by: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    pub status: CardStatus,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub card_image_url: Option<String>,
}

/// Request body for individual and batch card issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIssueRequest {
    pub employee_id: String,
    pub name: String,
    #[serde(default)]
    pub ename: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Issue sequence number; must be at least 1.
    pub card_count: u32,
    pub card_type: String,
    #[serde(rename = "photo_blob", default)]
    pub photo_blob: Option<String>,
}

/// Acknowledgement returned by the issue endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IssueReceipt {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// One row of the issue history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardIssueHistory {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "M_NO")]
    pub m_no: Option<String>,
    #[serde(default, alias = "M_NAME")]
    pub m_name: Option<String>,
    #[serde(default, alias = "M_DEPARTMENT")]
    pub m_department: Option<String>,
    #[serde(default, alias = "M_POSITION")]
    pub m_position: Option<String>,
    #[serde(default, alias = "CARD_TYPE")]
    pub card_type: Option<String>,
    #[serde(default, alias = "CARD_SNO")]
    pub card_sno: Option<String>,
    #[serde(default, alias = "CARD_COUNT")]
    pub card_count: Option<u32>,
    #[serde(default, alias = "CREATE_DT")]
    pub create_dt: Option<String>,
    #[serde(default, alias = "CREATE_ID")]
    pub create_id: Option<String>,
}

impl CardIssueHistory {
    /// Stable row identifier. Falls back to `{mNo}_{createDt}_{index}` when
    /// the backend omits `id`.
    #[must_use]
    pub fn row_key(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!(
                "{}_{}_{}",
                self.m_no.as_deref().unwrap_or_default(),
                self.create_dt.as_deref().unwrap_or_default(),
                index
            ),
        }
    }
}

/// Card face rendering input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardImageRequest {
    pub name: String,
    pub employee_id: String,
    pub department: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Rendered card face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    pub image_url: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_cards: u64,
    #[serde(default)]
    pub active_cards: u64,
    #[serde(default)]
    pub today_issued: u64,
    #[serde(default)]
    pub monthly_issued: u64,
}
