//! Month summaries and chart series.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use sea_orm::{QueryFilter, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EntryKind, LedgerError, MoneyCents, ResultLedger, categories, expenses, period::ReportWindow,
};

use super::{Ledger, retry_read};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Entry totals for one calendar month. Only stored entries count here,
/// recurring templates and income lines do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: u32,
    pub year: i32,
    pub total_income: MoneyCents,
    pub total_expenses: MoneyCents,
    pub balance: MoneyCents,
}

/// Which series to chart.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    Categories,
    Income,
    Expense,
}

impl ChartMetric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for ChartMetric {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "categories" => Ok(Self::Categories),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::Validation(format!(
                "invalid chart metric: {other}"
            ))),
        }
    }
}

/// Bucket granularity for the income/expense series.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPeriod {
    #[default]
    Monthly,
    Annual,
}

impl ChartPeriod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

impl TryFrom<&str> for ChartPeriod {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            other => Err(LedgerError::Validation(format!(
                "invalid chart period: {other}"
            ))),
        }
    }
}

/// Parallel label/value series ready for a chart widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<MoneyCents>,
}

impl Ledger {
    /// Entry totals for the given month.
    pub async fn month_summary(
        &self,
        user_id: i32,
        month: u32,
        year: i32,
    ) -> ResultLedger<MonthSummary> {
        let window = ReportWindow::month(year, month)?;
        retry_read!(self.build_month_summary(user_id, window, month, year).await)
    }

    async fn build_month_summary(
        &self,
        user_id: i32,
        window: ReportWindow,
        month: u32,
        year: i32,
    ) -> ResultLedger<MonthSummary> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.gte(window.start))
            .filter(expenses::Column::Date.lte(window.end))
            .all(&self.database)
            .await?;

        let mut total_income = MoneyCents::ZERO;
        let mut total_expenses = MoneyCents::ZERO;
        for row in rows {
            match EntryKind::try_from(row.kind.as_str())? {
                EntryKind::Income => total_income += MoneyCents::new(row.amount_cents),
                EntryKind::Expense => total_expenses += MoneyCents::new(row.amount_cents),
            }
        }

        Ok(MonthSummary {
            month,
            year,
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        })
    }

    /// Chart series for the year, optionally narrowed to one month.
    ///
    /// The category series sums income and expense entries together and
    /// ignores `period`; entries without a category are left out. The
    /// income/expense series apply the month filter only when bucketing
    /// by day.
    pub async fn chart_data(
        &self,
        user_id: i32,
        metric: ChartMetric,
        period: ChartPeriod,
        month: Option<u32>,
        year: i32,
    ) -> ResultLedger<ChartData> {
        if let Some(month) = month
            && !(1..=12).contains(&month)
        {
            return Err(LedgerError::Validation(format!("invalid month: {month}")));
        }
        retry_read!(
            self.build_chart_data(user_id, metric, period, month, year)
                .await
        )
    }

    async fn build_chart_data(
        &self,
        user_id: i32,
        metric: ChartMetric,
        period: ChartPeriod,
        month: Option<u32>,
        year: i32,
    ) -> ResultLedger<ChartData> {
        match metric {
            ChartMetric::Categories => self.category_series(user_id, month, year).await,
            ChartMetric::Income => {
                self.kind_series(user_id, EntryKind::Income, period, month, year)
                    .await
            }
            ChartMetric::Expense => {
                self.kind_series(user_id, EntryKind::Expense, period, month, year)
                    .await
            }
        }
    }

    async fn category_series(
        &self,
        user_id: i32,
        month: Option<u32>,
        year: i32,
    ) -> ResultLedger<ChartData> {
        let window = match month {
            Some(month) => ReportWindow::month(year, month)?,
            None => ReportWindow::year(year)?,
        };
        let rows = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Date.gte(window.start))
            .filter(expenses::Column::Date.lte(window.end))
            .all(&self.database)
            .await?;

        let names: HashMap<i32, String> = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let mut sums: BTreeMap<String, MoneyCents> = BTreeMap::new();
        for row in rows {
            let Some(category_id) = row.category_id else {
                continue;
            };
            let Some(name) = names.get(&category_id) else {
                continue;
            };
            *sums.entry(name.clone()).or_insert(MoneyCents::ZERO) +=
                MoneyCents::new(row.amount_cents);
        }

        let (labels, values) = sums.into_iter().unzip();
        Ok(ChartData { labels, values })
    }

    async fn kind_series(
        &self,
        user_id: i32,
        kind: EntryKind,
        period: ChartPeriod,
        month: Option<u32>,
        year: i32,
    ) -> ResultLedger<ChartData> {
        let year_window = ReportWindow::year(year)?;
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::Kind.eq(kind.as_str()))
            .filter(expenses::Column::Date.gte(year_window.start))
            .filter(expenses::Column::Date.lte(year_window.end));
        if period == ChartPeriod::Monthly
            && let Some(month) = month
        {
            let window = ReportWindow::month(year, month)?;
            query = query
                .filter(expenses::Column::Date.gte(window.start))
                .filter(expenses::Column::Date.lte(window.end));
        }
        let rows = query.all(&self.database).await?;

        match period {
            ChartPeriod::Monthly => {
                let labels = (1..=31).map(|day: u32| day.to_string()).collect();
                let mut values = vec![MoneyCents::ZERO; 31];
                for row in rows {
                    values[(row.date.day() - 1) as usize] += MoneyCents::new(row.amount_cents);
                }
                Ok(ChartData { labels, values })
            }
            ChartPeriod::Annual => {
                let labels = MONTH_LABELS.iter().map(ToString::to_string).collect();
                let mut values = vec![MoneyCents::ZERO; 12];
                for row in rows {
                    values[(row.date.month() - 1) as usize] += MoneyCents::new(row.amount_cents);
                }
                Ok(ChartData { labels, values })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_metric_round_trips_through_str() {
        for metric in [
            ChartMetric::Categories,
            ChartMetric::Income,
            ChartMetric::Expense,
        ] {
            assert_eq!(ChartMetric::try_from(metric.as_str()).unwrap(), metric);
        }
        assert!(ChartMetric::try_from("balance").is_err());
    }

    #[test]
    fn chart_period_defaults_to_monthly() {
        assert_eq!(ChartPeriod::default(), ChartPeriod::Monthly);
        assert!(ChartPeriod::try_from("weekly").is_err());
    }

    #[test]
    fn month_labels_cover_the_year() {
        assert_eq!(MONTH_LABELS.len(), 12);
        assert_eq!(MONTH_LABELS[0], "Jan");
        assert_eq!(MONTH_LABELS[11], "Dec");
    }
}
