//! Administrator endpoints under `/adm/reviews`.
use axum::{
    Json,
    extract::{
        Path, Query, RawQuery, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use book_reviews_shared::types::{
    Page, PageRequest, ReportId, ReportProcess, ReportSearch, ReviewId, ReviewReportDetail,
    ReviewReportSummary, SortSpec,
};
use serde::{Deserialize, Serialize};

use super::bad_path;
use crate::errors::ServiceError;
use crate::server::{Actor, AppState, RsData};

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub process: ReportProcess,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct HardDeleteParams {
    pub elapsedays: u32,
}

#[derive(Debug, Serialize)]
pub struct HardDeleteResult {
    pub deleted: u64,
}

fn parse_u32(name: &str, value: &str) -> Result<u32, ServiceError> {
    value
        .parse()
        .map_err(|_| ServiceError::invalid(format!("Invalid value for {name}: {value}")))
}

/// Reads the report search parameters. `sort` may repeat; each occurrence is one
/// `property[,asc|desc]` term.
pub(crate) fn parse_search(query: Option<&str>) -> Result<ReportSearch, ServiceError> {
    let mut keyword = None;
    let mut processed = false;
    let mut page = None;
    let mut size = None;
    let mut sort = Vec::new();

    for (name, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match name.as_ref() {
            "keyword" => keyword = Some(value.into_owned()),
            "processed" => {
                processed = value
                    .parse()
                    .map_err(|_| ServiceError::invalid(format!("Invalid value for processed: {value}")))?;
            }
            "page" => page = Some(parse_u32("page", &value)?),
            "size" => size = Some(parse_u32("size", &value)?),
            "sort" => sort.push(SortSpec::parse(&value)?),
            _ => {}
        }
    }

    Ok(ReportSearch {
        keyword,
        processed,
        page: PageRequest::from_params(page, size)?,
        sort,
    })
}

/// `GET /adm/reviews/report`
pub async fn search_reports(
    State(state): State<AppState>,
    actor: Actor,
    RawQuery(query): RawQuery,
) -> Result<RsData<Page<ReviewReportSummary>>, ServiceError> {
    actor.require_admin()?;
    let search = parse_search(query.as_deref())?;

    let reports = state.reports.search(&search).await?;
    Ok(RsData::with_data("200-1", "Review reports searched successfully", reports))
}

/// `GET /adm/reviews/report/{reportId}`
pub async fn get_report(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReportId>, PathRejection>,
) -> Result<RsData<ReviewReportDetail>, ServiceError> {
    actor.require_admin()?;
    let Path(report_id) = path.map_err(bad_path)?;

    let report = state.reports.get_report(report_id).await?;
    Ok(RsData::with_data("200-1", "Review report read successfully", report))
}

/// `PUT /adm/reviews/report/{reportId}`
pub async fn process_report(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReportId>, PathRejection>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<RsData<()>, ServiceError> {
    actor.require_admin()?;
    let Path(report_id) = path.map_err(bad_path)?;
    let Json(request) = body.map_err(|rejection| ServiceError::invalid(rejection.body_text()))?;

    state
        .reports
        .process(report_id, request.process, &request.answer)
        .await?;
    Ok(RsData::new("200-1", "Review report processed successfully"))
}

/// `DELETE /adm/reviews/hard?elapsedays=N`
pub async fn hard_delete(
    State(state): State<AppState>,
    actor: Actor,
    params: Result<Query<HardDeleteParams>, QueryRejection>,
) -> Result<RsData<HardDeleteResult>, ServiceError> {
    actor.require_admin()?;
    let Query(params) = params.map_err(|rejection| ServiceError::invalid(rejection.body_text()))?;

    let deleted = state.reviews.hard_delete(params.elapsedays).await?;
    Ok(RsData::with_data(
        "200-1",
        "Reviews deleted successfully",
        HardDeleteResult { deleted },
    ))
}

/// `DELETE /adm/reviews/soft/{reviewId}`
pub async fn soft_delete(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReviewId>, PathRejection>,
) -> Result<RsData<()>, ServiceError> {
    actor.require_admin()?;
    let Path(review_id) = path.map_err(bad_path)?;

    state.reviews.soft_delete(review_id).await?;
    Ok(RsData::new("200-1", "Review deleted successfully"))
}
