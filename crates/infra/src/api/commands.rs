//! Typed backend endpoints
//!
//! One method per backend operation the admin front end uses. All of them
//! go through [`ApiClient`], so they share token attachment, refresh and
//! error mapping. Every method fails with the [`ApiError`](crate::ApiError)
//! of its call.

use std::sync::Arc;

use cardissue_domain::constants::PROFILE_PATH;
use cardissue_domain::types::{
    BulkIssueRequest, CardHistoryQuery, CardImage, CardImageRequest, CardIssue, CardIssueHistory,
    CardIssueRequest, DashboardStats, EmployeeRecord, HistoryFilter, HistoryQuery, IssueReceipt,
    PagedResponse, UserInfo, UserUpdate,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::ApiClient;
use super::errors::ApiResult;
use super::request::{MultipartBody, RequestOptions};

const SPREADSHEET_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// API commands for card issuance operations
#[derive(Debug, Clone)]
pub struct CardIssueCommands {
    client: Arc<ApiClient>,
}

#[allow(clippy::missing_errors_doc)]
impl CardIssueCommands {
    /// Create a new commands instance
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[must_use]
    pub const fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Profile of the signed-in operator
    #[instrument(skip(self))]
    pub async fn profile(&self) -> ApiResult<Value> {
        self.client.call(PROFILE_PATH, RequestOptions::get()).await
    }

    /// Look up an employee (with photo) by employee number
    #[instrument(skip(self))]
    pub async fn search_by_employee_id(&self, employee_id: &str) -> ApiResult<EmployeeRecord> {
        let path = format!("/api/v1/user/search/{}", encode(employee_id));
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Look up an employee by free-text search term
    #[instrument(skip(self))]
    pub async fn search_employee(&self, term: &str) -> ApiResult<EmployeeRecord> {
        let path = format!("/api/v1/user/find/{}", encode(term));
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Employees saved as batch issuance targets
    #[instrument(skip(self))]
    pub async fn saved_batch_list(&self) -> ApiResult<Vec<EmployeeRecord>> {
        self.client.call_json("/api/v1/batch/list", RequestOptions::get()).await
    }

    /// Save batch issuance targets
    #[instrument(skip(self, employees))]
    pub async fn save_batch_employees<T: Serialize + ?Sized>(
        &self,
        employees: &T,
    ) -> ApiResult<Value> {
        let options = RequestOptions::post().with_serialized(employees)?;
        self.client.call("/api/v1/batch/save", options).await
    }

    /// Remove one saved batch target
    #[instrument(skip(self))]
    pub async fn remove_batch_employee(&self, employee_id: &str) -> ApiResult<Value> {
        let path = format!("/api/v1/batch/delete/{}", encode(employee_id));
        self.client.call(&path, RequestOptions::delete()).await
    }

    /// Upload a spreadsheet of employee numbers for server-side validation
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload_batch_spreadsheet(
        &self,
        file_name: &str,
        data: Vec<u8>,
    ) -> ApiResult<Value> {
        let form = MultipartBody::new().file("file", file_name, data, Some(SPREADSHEET_MIME));
        self.client
            .call("/api/v1/batch/upload-excel", RequestOptions::post().with_multipart(form))
            .await
    }

    /// Cards previously issued to one employee
    #[instrument(skip(self))]
    pub async fn card_history(
        &self,
        query: &CardHistoryQuery,
    ) -> ApiResult<PagedResponse<CardIssue>> {
        let path = with_query("/api/v1/card/history", &query.to_query_pairs());
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Issue history across all employees
    #[instrument(skip(self))]
    pub async fn card_issue_history(
        &self,
        query: &HistoryQuery,
    ) -> ApiResult<PagedResponse<CardIssueHistory>> {
        let path = with_query("/api/v1/card/issue-history", &query.to_query_pairs());
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Issue history as a spreadsheet file
    #[instrument(skip(self))]
    pub async fn export_card_issue_history(&self, filter: &HistoryFilter) -> ApiResult<Vec<u8>> {
        let path = with_query("/api/v1/card/issue-history/export", &filter.to_query_pairs());
        let bytes = self.client.download(&path, RequestOptions::get()).await?;
        debug!(bytes = bytes.len(), "Exported issue history");
        Ok(bytes)
    }

    /// Issue one card
    #[instrument(skip(self, request), fields(employee_id = %request.employee_id))]
    pub async fn issue_card(&self, request: &CardIssueRequest) -> ApiResult<IssueReceipt> {
        let options = RequestOptions::post().with_serialized(request)?;
        self.client.call_json("/api/v1/card/issue", options).await
    }

    /// Issue one card as part of a batch run
    #[instrument(skip(self, request), fields(employee_id = %request.employee_id))]
    pub async fn issue_batch_card(&self, request: &CardIssueRequest) -> ApiResult<IssueReceipt> {
        let options = RequestOptions::post().with_serialized(request)?;
        self.client.call_json("/api/v1/card/issueBatchCard", options).await
    }

    /// Find a user account by employee number
    #[instrument(skip(self))]
    pub async fn search_user(&self, employee_id: &str) -> ApiResult<UserInfo> {
        let path = with_query("/users/search", &[("employeeId", employee_id.to_string())]);
        self.client.call_json(&path, RequestOptions::get()).await
    }

    #[instrument(skip(self))]
    pub async fn user_by_id(&self, user_id: &str) -> ApiResult<UserInfo> {
        let path = format!("/users/{}", encode(user_id));
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Update the fields set in `update`, returning the stored account
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> ApiResult<UserInfo> {
        let path = format!("/users/{}", encode(user_id));
        let options = RequestOptions::put().with_serialized(update)?;
        self.client.call_json(&path, options).await
    }

    /// Issue cards for several users in one request
    #[instrument(skip(self, request), fields(users = request.users.len()))]
    pub async fn bulk_issue_cards(&self, request: &BulkIssueRequest) -> ApiResult<Vec<CardIssue>> {
        let options = RequestOptions::post().with_serialized(request)?;
        let issued: Vec<CardIssue> = self.client.call_json("/cards/bulk-issue", options).await?;
        debug!(issued = issued.len(), "Bulk issue complete");
        Ok(issued)
    }

    #[instrument(skip(self))]
    pub async fn card_by_id(&self, card_id: &str) -> ApiResult<CardIssue> {
        let path = format!("/cards/{}", encode(card_id));
        self.client.call_json(&path, RequestOptions::get()).await
    }

    /// Render the card face for preview
    #[instrument(skip(self, request), fields(employee_id = %request.employee_id))]
    pub async fn generate_card_image(&self, request: &CardImageRequest) -> ApiResult<CardImage> {
        let options = RequestOptions::post().with_serialized(request)?;
        self.client.call_json("/cards/generate-image", options).await
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.client.call_json("/dashboard/stats", RequestOptions::get()).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate_card(&self, card_id: &str) -> ApiResult<Value> {
        let path = format!("/cards/{}/deactivate", encode(card_id));
        self.client.call(&path, RequestOptions::put()).await
    }
}

fn with_query(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}
