//! PostgreSQL implementation of [`ReviewReportsRepository`].
//!
//! The admin search is assembled with `sqlx::QueryBuilder`: user input only ever
//! reaches the statement as bind parameters, and sort columns come from a closed
//! mapping of [`ReportSortField`] values.
use async_trait::async_trait;
use book_reviews_shared::types::{
    NewReviewReport, Page, ReportId, ReportProcess, ReportSearch, ReportSortField,
    ReviewReport, ReviewReportDetail, ReviewReportState, ReviewReportSummary, SortOrder,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::rows::{ReportDetailRow, ReportRow, ReportSummaryRow};
use crate::{RepositoryError, ReviewReportsRepository};

const REPORT_JOINS: &str = " FROM review_reports rr \
     JOIN members reporter ON reporter.id = rr.member_id \
     JOIN reviews r ON r.id = rr.review_id \
     JOIN members author ON author.id = r.member_id \
     JOIN books b ON b.id = r.book_id";

const SUMMARY_COLUMNS: &str = "SELECT rr.id, rr.created_at AS created_date, rr.reason, \
     rr.description, reporter.name AS member_name, rr.state AS report_state, \
     author.name AS review_author, b.title AS book_name";

pub struct PostgresReviewReportsRepository {
    pool: PgPool,
}

impl PostgresReviewReportsRepository {
    pub async fn new(pool: PgPool) -> Result<Self, RepositoryError> {
        Ok(Self { pool })
    }
}

/// Escapes `LIKE` metacharacters so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn sort_column(field: ReportSortField) -> &'static str {
    match field {
        ReportSortField::Id => "rr.id",
        ReportSortField::CreatedDate => "rr.created_at",
        ReportSortField::Reason => "rr.reason",
        ReportSortField::ReportState => "rr.state",
    }
}

fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, search: &ReportSearch) {
    builder.push(" WHERE rr.state ");
    builder.push(if search.processed { "<> " } else { "= " });
    builder.push_bind(ReviewReportState::Pending.as_str());

    if let Some(keyword) = search.keyword() {
        builder.push(" AND rr.reason ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(keyword)));
        builder.push(" ESCAPE '\\'");
    }
}

/// Builds the page query for a report search.
///
/// Requested orderings are applied in order, followed by `rr.id ASC` so that pages are
/// stable when the requested columns tie.
pub(crate) fn build_search_query(search: &ReportSearch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SUMMARY_COLUMNS);
    builder.push(REPORT_JOINS);
    push_filters(&mut builder, search);

    builder.push(" ORDER BY ");
    for spec in &search.sort {
        builder.push(sort_column(spec.field));
        builder.push(" ");
        builder.push(spec.order.as_sql());
        builder.push(", ");
    }
    builder.push(sort_column(ReportSortField::Id));
    builder.push(" ");
    builder.push(SortOrder::Asc.as_sql());

    builder.push(" LIMIT ");
    builder.push_bind(search.page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(search.page.offset());
    builder
}

/// Builds the total-count query matching [`build_search_query`]'s filters.
pub(crate) fn build_count_query(search: &ReportSearch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*)");
    builder.push(REPORT_JOINS);
    push_filters(&mut builder, search);
    builder
}

#[async_trait]
impl ReviewReportsRepository for PostgresReviewReportsRepository {
    async fn insert_report(&self, report: &NewReviewReport) -> Result<ReviewReport, RepositoryError> {
        let row = sqlx::query_as::<_, ReportRow>(
            "INSERT INTO review_reports (review_id, member_id, reason, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, review_id, member_id, reason, description, state, answer, created_at, modified_at",
        )
        .bind(report.review_id)
        .bind(report.member_id)
        .bind(&report.reason)
        .bind(&report.description)
        .fetch_one(&self.pool)
        .await?;

        ReviewReport::try_from(row)
    }

    async fn find_report(&self, report_id: ReportId) -> Result<Option<ReviewReportDetail>, RepositoryError> {
        let query = format!(
            "SELECT rr.id, rr.reason, rr.description, reporter.name AS member_name, \
                rr.created_at AS created_date, rr.state AS report_state, rr.answer, \
                r.id AS review_id, r.content AS review_content, r.rate AS review_rate, \
                author.name AS review_author, b.title AS book_name, b.author AS book_author\
             {REPORT_JOINS} WHERE rr.id = $1"
        );
        sqlx::query_as::<_, ReportDetailRow>(&query)
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await?
            .map(ReviewReportDetail::try_from)
            .transpose()
    }

    async fn search(&self, search: &ReportSearch) -> Result<Page<ReviewReportSummary>, RepositoryError> {
        let (total,): (i64,) = build_count_query(search)
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<ReportSummaryRow> = build_search_query(search)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let reports = rows
            .into_iter()
            .map(ReviewReportSummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(total, returned = reports.len(), "Searched review reports");
        Ok(Page::new(reports, search.page, total.max(0) as u64))
    }

    async fn process_report(
        &self,
        report_id: ReportId,
        process: ReportProcess,
        answer: &str,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let state = ReviewReportState::from(process);

        let review_id: Option<(i64,)> = sqlx::query_as(
            "UPDATE review_reports SET state = $2, answer = $3, modified_at = NOW() \
             WHERE id = $1 RETURNING review_id",
        )
        .bind(report_id)
        .bind(state.as_str())
        .bind(answer)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((review_id,)) = review_id else {
            return Ok(false);
        };

        match process {
            ReportProcess::Delete => {
                sqlx::query("UPDATE reviews SET deleted = TRUE, modified_at = NOW() WHERE id = $1")
                    .bind(review_id)
                    .execute(&mut *tx)
                    .await?;
            }
            ReportProcess::EditRequired => {
                sqlx::query(
                    "UPDATE reviews SET report_state = $2, admin_message = $3, modified_at = NOW() \
                     WHERE id = $1",
                )
                .bind(review_id)
                .bind(state.as_str())
                .bind(answer)
                .execute(&mut *tx)
                .await?;
            }
            ReportProcess::Accept | ReportProcess::Reject => {}
        }

        tx.commit().await?;
        debug!(report_id, review_id, state = %state, "Processed review report");
        Ok(true)
    }
}
