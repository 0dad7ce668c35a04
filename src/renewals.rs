//! Renewal tracking: month bucketing and the pending/missed/dismissed
//! classification applied to policy records.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{FloaterType, InsuranceCover, InsuranceType};

/// Convert a "YYYY-MM" token into the half-open interval
/// [first day of month, first day of next month).
pub fn month_range(token: &str) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let invalid = || ApiError::InvalidFormat(format!("invalid month '{token}', expected YYYY-MM"));

    let (y, m) = token.split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((start, end))
}

/// Parse a "YYYY-MM-DD" body field into a date, failing the request
/// without touching the store when it does not parse.
pub fn parse_renewal_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidFormat(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStatus {
    Pending,
    Missed,
    Dismissed,
}

impl FromStr for RenewalStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RenewalStatus::Pending),
            "missed" => Ok(RenewalStatus::Missed),
            "dismissed" => Ok(RenewalStatus::Dismissed),
            other => Err(ApiError::InvalidFormat(format!(
                "invalid status '{other}', expected pending|missed|dismissed"
            ))),
        }
    }
}

/// Classify a health policy. Dismissal wins over everything; otherwise
/// a date before today is missed and anything else is still pending.
pub fn classify_health(renewal_date: NaiveDate, dismissed: bool, today: NaiveDate) -> RenewalStatus {
    if dismissed {
        RenewalStatus::Dismissed
    } else if renewal_date < today {
        RenewalStatus::Missed
    } else {
        RenewalStatus::Pending
    }
}

/// Vehicle policies have no dismissal concept.
pub fn classify_vehicle(renewal_date: NaiveDate, today: NaiveDate) -> RenewalStatus {
    if renewal_date < today {
        RenewalStatus::Missed
    } else {
        RenewalStatus::Pending
    }
}

/// Owning client identity embedded in renewal listings.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub id: i64,
    pub name: String,
    pub mobile: String,
    pub place: String,
    pub insurance_type: InsuranceType,
}

/// A health policy joined with its owning client, restricted upstream
/// to rows with a renewal_date inside the queried month.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct HealthRenewalRow {
    pub id: i64,
    pub renewal_date: NaiveDate,
    pub renewal_dismissed: bool,
    pub floater_type: FloaterType,
    pub ages: String,
    pub ped: String,
    pub client_id: i64,
    pub client_name: String,
    pub client_mobile: String,
    pub client_place: String,
    pub client_insurance_type: InsuranceType,
}

impl HealthRenewalRow {
    pub fn status(&self, today: NaiveDate) -> RenewalStatus {
        classify_health(self.renewal_date, self.renewal_dismissed, today)
    }

    pub fn into_entry(self) -> HealthRenewalEntry {
        HealthRenewalEntry {
            id: self.id,
            renewal_date: self.renewal_date,
            renewal_dismissed: self.renewal_dismissed,
            floater_type: self.floater_type,
            ages: self.ages,
            ped: self.ped,
            client: ClientSummary {
                id: self.client_id,
                name: self.client_name,
                mobile: self.client_mobile,
                place: self.client_place,
                insurance_type: self.client_insurance_type,
            },
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct VehicleRenewalRow {
    pub id: i64,
    pub renewal_date: NaiveDate,
    pub vehicle_type: String,
    pub insurance_cover: InsuranceCover,
    pub client_id: i64,
    pub client_name: String,
    pub client_mobile: String,
    pub client_place: String,
    pub client_insurance_type: InsuranceType,
}

impl VehicleRenewalRow {
    pub fn status(&self, today: NaiveDate) -> RenewalStatus {
        classify_vehicle(self.renewal_date, today)
    }

    pub fn into_entry(self) -> VehicleRenewalEntry {
        VehicleRenewalEntry {
            id: self.id,
            renewal_date: self.renewal_date,
            vehicle_type: self.vehicle_type,
            insurance_cover: self.insurance_cover,
            client: ClientSummary {
                id: self.client_id,
                name: self.client_name,
                mobile: self.client_mobile,
                place: self.client_place,
                insurance_type: self.client_insurance_type,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthRenewalEntry {
    pub id: i64,
    pub renewal_date: NaiveDate,
    pub renewal_dismissed: bool,
    pub floater_type: FloaterType,
    pub ages: String,
    pub ped: String,
    pub client: ClientSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleRenewalEntry {
    pub id: i64,
    pub renewal_date: NaiveDate,
    pub vehicle_type: String,
    pub insurance_cover: InsuranceCover,
    pub client: ClientSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub month: String,
    pub pending: u64,
    pub missed: u64,
    pub dismissed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSummary {
    pub month: String,
    pub pending: u64,
    pub missed: u64,
}

/// Partition in-month health rows into counts. Every row lands in
/// exactly one bucket.
pub fn summarize_health(rows: &[HealthRenewalRow], today: NaiveDate, month: &str) -> HealthSummary {
    let mut summary = HealthSummary {
        month: month.to_string(),
        pending: 0,
        missed: 0,
        dismissed: 0,
    };
    for row in rows {
        match row.status(today) {
            RenewalStatus::Pending => summary.pending += 1,
            RenewalStatus::Missed => summary.missed += 1,
            RenewalStatus::Dismissed => summary.dismissed += 1,
        }
    }
    summary
}

pub fn summarize_vehicle(
    rows: &[VehicleRenewalRow],
    today: NaiveDate,
    month: &str,
) -> VehicleSummary {
    let mut summary = VehicleSummary {
        month: month.to_string(),
        pending: 0,
        missed: 0,
    };
    for row in rows {
        match row.status(today) {
            RenewalStatus::Pending => summary.pending += 1,
            RenewalStatus::Missed => summary.missed += 1,
            // Vehicle rows carry no dismissal flag; the classifier
            // never produces this.
            RenewalStatus::Dismissed => {}
        }
    }
    summary
}
