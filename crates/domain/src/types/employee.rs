//! Employee lookup records

use serde::{Deserialize, Serialize};

use super::card::CardIssueRequest;

/// Staff member as returned by the member/photo lookup endpoints.
///
/// The member lookup answers with `m_`-prefixed columns while the batch
/// endpoints use short names; both deserialize into this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmployeeRecord {
    /// Employee number.
    #[serde(rename = "no", alias = "employeeId", alias = "m_no")]
    pub employee_id: String,
    #[serde(alias = "m_name")]
    pub name: String,
    /// Romanized name printed on the card.
    #[serde(default, alias = "m_e_name")]
    pub ename: Option<String>,
    #[serde(default, alias = "m_department_name")]
    pub department: Option<String>,
    #[serde(default, alias = "m_position_name")]
    pub position: Option<String>,
    #[serde(default, alias = "m_group")]
    pub group: Option<String>,
    #[serde(default, alias = "m_status")]
    pub status: Option<String>,
    /// Base64 photo as stored by the backend.
    #[serde(default, alias = "photoBlob")]
    pub photo_blob: Option<String>,
    /// Issue round of the employee's most recent card.
    #[serde(default, alias = "cardCount")]
    pub card_count: Option<u32>,
}

impl EmployeeRecord {
    /// Issue request for this employee, seeded with the stored issue round.
    #[must_use]
    pub fn issue_request(&self, card_type: impl Into<String>) -> CardIssueRequest {
        CardIssueRequest {
            employee_id: self.employee_id.clone(),
            name: self.name.clone(),
            ename: self.ename.clone(),
            department: self.department.clone(),
            position: self.position.clone(),
            card_count: self.card_count.unwrap_or_default(),
            card_type: card_type.into(),
            photo_blob: self.photo_blob.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_both_employee_number_spellings() {
        let a: EmployeeRecord =
            serde_json::from_value(json!({ "no": "20231", "name": "Kim" })).unwrap();
        let b: EmployeeRecord =
            serde_json::from_value(json!({ "employeeId": "20231", "name": "Kim" })).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.employee_id, "20231");
        assert!(a.photo_blob.is_none());
    }

    #[test]
    fn accepts_member_lookup_columns() {
        let record: EmployeeRecord = serde_json::from_value(json!({
            "m_no": "20231",
            "m_name": "Kim",
            "m_e_name": "KIM JIWOO",
            "m_department_name": "Nursing",
            "m_position_name": "Charge Nurse",
            "m_group": "Ward 3",
            "m_status": "active",
            "photo_blob": "AAAA",
            "card_count": 2
        }))
        .unwrap();

        assert_eq!(record.employee_id, "20231");
        assert_eq!(record.ename.as_deref(), Some("KIM JIWOO"));
        assert_eq!(record.department.as_deref(), Some("Nursing"));
        assert_eq!(record.position.as_deref(), Some("Charge Nurse"));
        assert_eq!(record.group.as_deref(), Some("Ward 3"));
        assert_eq!(record.status.as_deref(), Some("active"));
        assert_eq!(record.card_count, Some(2));
    }

    #[test]
    fn issue_request_carries_card_round() {
        let record = EmployeeRecord {
            employee_id: "20231".to_string(),
            name: "Kim".to_string(),
            department: Some("Nursing".to_string()),
            card_count: Some(3),
            ..Default::default()
        };
        let request = record.issue_request("employee");

        assert_eq!(request.employee_id, "20231");
        assert_eq!(request.card_count, 3);
        assert_eq!(request.card_type, "employee");
        assert_eq!(request.department.as_deref(), Some("Nursing"));
    }

    #[test]
    fn serializes_with_backend_names() {
        let record = EmployeeRecord {
            employee_id: "7".to_string(),
            name: "Lee".to_string(),
            photo_blob: Some("AAAA".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["no"], "7");
        assert_eq!(value["photo_blob"], "AAAA");
    }
}
