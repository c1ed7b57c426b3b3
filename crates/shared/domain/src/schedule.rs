//! Schedule settings owned by a store.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_WEEKDAY, MIN_WEEKDAY};
use crate::error::{DomainError, DomainResult};

/// Minimum work time that earns a break, and how long that break is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BreakRule {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub min_work_minutes: i32,
    pub break_minutes: i32,
    pub is_paid: bool,
}

/// Desired headcount for a weekday time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StaffingTarget {
    pub id: Uuid,
    pub store_id: Uuid,
    #[serde(default)]
    pub work_item_id: Option<Uuid>,
    pub weekday: u8,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00:00"))]
    pub start_time: NaiveTime,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "13:00:00"))]
    pub end_time: NaiveTime,
    pub min_staff: i32,
    #[serde(default)]
    pub max_staff: Option<i32>,
}

/// A kind of work staff can be scheduled for (register, kitchen, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WorkItem {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub job_role_id: Option<Uuid>,
    pub is_active: bool,
}

/// Opening hours for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BusinessHour {
    pub id: Uuid,
    pub store_id: Uuid,
    pub weekday: u8,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "09:00:00"))]
    pub open_time: Option<NaiveTime>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "22:00:00"))]
    pub close_time: Option<NaiveTime>,
    pub is_closed: bool,
}

/// A store-specific holiday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Holiday {
    pub id: Uuid,
    pub store_id: Uuid,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2024-09-17"))]
    pub date: NaiveDate,
    pub name: String,
    pub is_closed: bool,
}

/// A job title staff can hold (barista, cashier, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct JobRole {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Rules
// =============================================================================

pub fn check_weekday(weekday: u8) -> DomainResult<()> {
    if (MIN_WEEKDAY..=MAX_WEEKDAY).contains(&weekday) {
        Ok(())
    } else {
        Err(DomainError::validation("validation.weekday_range"))
    }
}

/// A window must end after it starts; overnight windows are not supported.
pub fn check_time_range(start: NaiveTime, end: NaiveTime) -> DomainResult<()> {
    if start < end {
        Ok(())
    } else {
        Err(DomainError::validation("validation.time_range"))
    }
}

pub fn check_staff_range(min_staff: i32, max_staff: Option<i32>) -> DomainResult<()> {
    if min_staff < 0 {
        return Err(DomainError::validation("validation.staff_range"));
    }
    match max_staff {
        Some(max) if max < min_staff => Err(DomainError::validation("validation.staff_range")),
        _ => Ok(()),
    }
}

pub fn check_break_rule(min_work_minutes: i32, break_minutes: i32) -> DomainResult<()> {
    if break_minutes < min_work_minutes {
        Ok(())
    } else {
        Err(DomainError::validation("validation.break_shorter_than_work"))
    }
}

/// Display colour as `#RRGGBB`.
pub fn check_color(color: &str) -> DomainResult<()> {
    match color.as_bytes() {
        [b'#', hex @ ..] if hex.len() == 6 && hex.iter().all(u8::is_ascii_hexdigit) => Ok(()),
        _ => Err(DomainError::validation("validation.color_format")),
    }
}

/// Closed days carry no times; open days carry both, in order.
pub fn check_business_hour(
    is_closed: bool,
    open_time: Option<NaiveTime>,
    close_time: Option<NaiveTime>,
) -> DomainResult<()> {
    match (is_closed, open_time, close_time) {
        (true, None, None) => Ok(()),
        (true, _, _) => Err(DomainError::validation("validation.closed_day_has_hours")),
        (false, Some(open), Some(close)) => check_time_range(open, close),
        (false, _, _) => Err(DomainError::validation("validation.open_day_needs_hours")),
    }
}

/// Each weekday may appear at most once in a weekly schedule.
pub fn check_unique_weekdays(weekdays: impl IntoIterator<Item = u8>) -> DomainResult<()> {
    let mut seen = [false; 7];
    for weekday in weekdays {
        check_weekday(weekday)?;
        let slot = &mut seen[usize::from(weekday)];
        if *slot {
            return Err(DomainError::validation("validation.weekday_duplicate"));
        }
        *slot = true;
    }
    Ok(())
}
