#![forbid(unsafe_code)]

use ob_core::StepData;
use ob_core::ids::ClientId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateClientRequest {
    pub display_name: String,
    /// Derived from `display_name` when absent or blank.
    pub slug: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveStepRequest {
    pub client_id: ClientId,
    /// Unvalidated step number as received from the caller.
    pub step: i64,
    pub data: StepData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClientOrder {
    /// Most recently created first (dashboards).
    #[default]
    Newest,
    /// By display name, case-insensitive (listings).
    Alphabetical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ListClientsRequest {
    pub include_inactive: bool,
    pub order: ClientOrder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordAttachmentRequest {
    pub client_id: ClientId,
    pub original_filename: String,
    pub stored_filename: String,
    pub attachment_type: String,
    pub storage_path: String,
    pub size_bytes: u64,
    pub step: Option<i64>,
    pub uploaded_at_ms: i64,
}
