//! Analytics API endpoints.

use api_types::analytics::{
    ChartDataQuery, ChartDataView, ChartMetric as ApiMetric, ChartPeriod as ApiPeriod,
    SummaryQuery, SummaryView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use ledger::{ChartMetric, ChartPeriod, MoneyCents, User};

use crate::{ServerError, server::ServerState};

fn domain_metric(metric: ApiMetric) -> ChartMetric {
    match metric {
        ApiMetric::Categories => ChartMetric::Categories,
        ApiMetric::Income => ChartMetric::Income,
        ApiMetric::Expense => ChartMetric::Expense,
    }
}

fn domain_period(period: ApiPeriod) -> ChartPeriod {
    match period {
        ApiPeriod::Monthly => ChartPeriod::Monthly,
        ApiPeriod::Annual => ChartPeriod::Annual,
    }
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryView>, ServerError> {
    let summary = state
        .ledger
        .month_summary(user.id, query.month, query.year)
        .await?;

    Ok(Json(SummaryView {
        month: summary.month,
        year: summary.year,
        total_income_cents: summary.total_income.cents(),
        total_expenses_cents: summary.total_expenses.cents(),
        balance_cents: summary.balance.cents(),
    }))
}

pub async fn chart_data(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ChartDataQuery>,
) -> Result<Json<ChartDataView>, ServerError> {
    let period = domain_period(query.period.unwrap_or_default());
    let data = state
        .ledger
        .chart_data(
            user.id,
            domain_metric(query.metric),
            period,
            query.month,
            query.year,
        )
        .await?;

    Ok(Json(ChartDataView {
        labels: data.labels,
        values: data.values.into_iter().map(MoneyCents::cents).collect(),
    }))
}
