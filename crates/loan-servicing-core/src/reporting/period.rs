use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::LoanServicingError;
use crate::LoanServicingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Monthly,
    Annual,
}

/// A reporting window, half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub report_type: ReportType,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// Parse `YYYY-MM` for monthly reports or `YYYY` for annual ones.
    pub fn parse(report_type: ReportType, period: &str) -> LoanServicingResult<Self> {
        let period = period.trim();
        let start = match report_type {
            ReportType::Monthly => {
                let (year, month) = period
                    .split_once('-')
                    .filter(|(y, m)| y.len() == 4 && m.len() == 2)
                    .ok_or_else(|| invalid_period(period, "expected YYYY-MM"))?;
                let year: i32 = year
                    .parse()
                    .map_err(|_| invalid_period(period, "year is not a number"))?;
                let month: u32 = month
                    .parse()
                    .map_err(|_| invalid_period(period, "month is not a number"))?;
                NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| invalid_period(period, "month out of range"))?
            }
            ReportType::Annual => {
                if period.len() != 4 {
                    return Err(invalid_period(period, "expected YYYY"));
                }
                let year: i32 = period
                    .parse()
                    .map_err(|_| invalid_period(period, "year is not a number"))?;
                NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| invalid_period(period, "year out of range"))?
            }
        };

        let span = match report_type {
            ReportType::Monthly => Months::new(1),
            ReportType::Annual => Months::new(12),
        };
        let end = start
            .checked_add_months(span)
            .ok_or_else(|| invalid_period(period, "period end out of range"))?;

        Ok(ReportPeriod {
            report_type,
            label: period.to_string(),
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// "the month of 2024-03" / "the year 2024"
    pub fn describe(&self) -> String {
        match self.report_type {
            ReportType::Monthly => format!("the month of {}", self.label),
            ReportType::Annual => format!("the year {}", self.label),
        }
    }
}

fn invalid_period(period: &str, reason: &str) -> LoanServicingError {
    LoanServicingError::InvalidInput {
        field: "period".into(),
        reason: format!("'{period}': {reason}"),
    }
}
