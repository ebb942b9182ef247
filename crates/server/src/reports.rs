//! Report API endpoints: JSON document, PDF download, email delivery.

use api_types::{
    Message,
    report::{
        EmailReportRequest, ReportKind as ApiReportKind, ReportQuery as ApiReportQuery,
        ReportTransactionView, ReportView,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use ledger::{ReportDocument, ReportKind, ReportQuery, User};

use crate::{ServerError, expenses, pdf, server::ServerState};

fn domain_report_kind(kind: ApiReportKind) -> ReportKind {
    match kind {
        ApiReportKind::Monthly => ReportKind::Monthly,
        ApiReportKind::Annual => ReportKind::Annual,
        ApiReportKind::Category => ReportKind::Category,
    }
}

fn api_report_kind(kind: ReportKind) -> ApiReportKind {
    match kind {
        ReportKind::Monthly => ApiReportKind::Monthly,
        ReportKind::Annual => ApiReportKind::Annual,
        ReportKind::Category => ApiReportKind::Category,
    }
}

fn domain_query(query: ApiReportQuery) -> ReportQuery {
    ReportQuery {
        kind: domain_report_kind(query.kind),
        category_id: query.category_id,
        month: query.month,
        year: query.year,
        start_date: query.start_date,
        end_date: query.end_date,
    }
}

fn view(document: ReportDocument) -> ReportView {
    ReportView {
        kind: api_report_kind(document.kind),
        month: document.month,
        year: document.year,
        total_income_cents: document.total_income.cents(),
        total_expense_cents: document.total_expense.cents(),
        balance_cents: document.balance.cents(),
        transactions: document
            .transactions
            .into_iter()
            .map(|entry| ReportTransactionView {
                id: entry.id,
                description: entry.description,
                amount_cents: entry.amount.cents(),
                kind: expenses::api_kind(entry.kind),
                date: entry.date,
                category_id: entry.category_id,
            })
            .collect(),
    }
}

pub async fn generate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ApiReportQuery>,
) -> Result<Json<ReportView>, ServerError> {
    let document = state.ledger.report(user.id, &domain_query(query)).await?;

    Ok(Json(view(document)))
}

pub async fn download(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ApiReportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let document = state.ledger.report(user.id, &domain_query(query)).await?;
    let bytes = pdf::render_report(&document, &user.name)?;
    let filename = pdf::report_filename(document.month, document.year);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// Renders the report and mails it; a delivery failure surfaces after the
/// PDF was already generated, nothing is retried here.
pub async fn email(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<EmailReportRequest>,
) -> Result<Json<Message>, ServerError> {
    let query = ReportQuery {
        kind: domain_report_kind(payload.kind),
        category_id: payload.category_id,
        month: payload.month,
        year: payload.year,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let document = state.ledger.report(user.id, &query).await?;
    let bytes = pdf::render_report(&document, &user.name)?;

    state
        .mailer
        .send_report(&payload.email, &user.name, bytes, document.month, document.year)
        .await?;

    Ok(Json(Message {
        message: format!("report sent to {}", payload.email),
    }))
}
