//! /records handler — recent terminal upload outcomes.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use inlet_services::UploadRecord;

use super::ApiState;

#[derive(Deserialize)]
pub struct RecordsQuery {
    pub user: Option<String>,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<UploadRecord>,
}

pub async fn handle_records(
    State(state): State<ApiState>,
    Query(query): Query<RecordsQuery>,
) -> Json<RecordsResponse> {
    let records = match query.user {
        Some(user) => state.service.records().get(&user),
        None => state.service.records().all(),
    };
    Json(RecordsResponse { records })
}
