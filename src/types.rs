//! Common datatypes supporting the dashboard pipeline

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::Error;

/// The number of decimals shown for pie chart percentages
pub const PERCENT_SCALE: u32 = 1;

/// Columns that must be present in the order data header
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "order_id",
    "customer_state",
    "order_purchase_timestamp",
    "order_delivered_customer_date",
    "order_approved_at",
    "geolocation_lat",
    "geolocation_lng",
];

/// Header of the optional on-time delivery column
pub const ON_TIME_COLUMN: &str = "delivered_on_time";

/// Accepted layouts for timestamp columns, tried in order
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Identifier of an order. Several rows may share one, one per line item.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(String);

impl From<&str> for OrderId {
    fn from(order_id: &str) -> Self {
        Self(order_id.to_owned())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line item of a customer purchase, as read from the order data file
#[derive(Debug, Deserialize, Clone)]
pub struct OrderRecord {
    pub(crate) order_id: OrderId,
    pub(crate) customer_state: String,
    #[serde(
        rename = "order_purchase_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub(crate) purchased_at: NaiveDateTime,
    #[serde(
        rename = "order_delivered_customer_date",
        deserialize_with = "deserialize_option_timestamp"
    )]
    pub(crate) delivered_at: Option<NaiveDateTime>,
    #[serde(
        rename = "order_approved_at",
        deserialize_with = "deserialize_option_timestamp"
    )]
    pub(crate) approved_at: Option<NaiveDateTime>,
    /// Non-numeric coordinates are read as missing; `NaN` and infinities are
    /// kept here but never make a [`MapPoint`]
    #[serde(rename = "geolocation_lat", deserialize_with = "csv::invalid_option")]
    pub(crate) latitude: Option<f64>,
    #[serde(rename = "geolocation_lng", deserialize_with = "csv::invalid_option")]
    pub(crate) longitude: Option<f64>,
    /// Textual label of the on-time flag, e.g. `True` or `False`
    #[serde(default)]
    pub(crate) delivered_on_time: Option<String>,
}

/// Parses a timestamp in one of [`TIMESTAMP_FORMATS`], or a bare date taken as midnight
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Function to help [`serde`] deserialize a required timestamp column
fn deserialize_timestamp<'de, D>(value: D) -> Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(value)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

/// Function to help [`serde`] deserialize a timestamp column that may be left empty
fn deserialize_option_timestamp<'de, D>(value: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(value)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {text:?}"))),
    }
}

impl OrderRecord {
    /// Returns the order this line item belongs to
    #[must_use]
    #[inline]
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Returns the customer's state code
    #[must_use]
    #[inline]
    pub fn customer_state(&self) -> &str {
        &self.customer_state
    }

    /// Returns when the order was placed
    #[must_use]
    #[inline]
    pub fn purchased_at(&self) -> NaiveDateTime {
        self.purchased_at
    }

    /// Returns the calendar day the order was placed
    #[must_use]
    #[inline]
    pub fn purchase_date(&self) -> NaiveDate {
        self.purchased_at.date()
    }

    /// Returns when the order reached the customer, if it did
    #[must_use]
    #[inline]
    pub fn delivered_at(&self) -> Option<NaiveDateTime> {
        self.delivered_at
    }

    /// Returns when payment for the order was approved, if it was
    #[must_use]
    #[inline]
    pub fn approved_at(&self) -> Option<NaiveDateTime> {
        self.approved_at
    }

    /// Returns the customer's coordinates when both are known and finite
    #[must_use]
    pub fn location(&self) -> Option<MapPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Some(MapPoint {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }

    /// Returns the on-time delivery label, if recorded
    #[must_use]
    #[inline]
    pub fn delivered_on_time(&self) -> Option<&str> {
        self.delivered_on_time.as_deref()
    }
}

/// Optional columns found in the order data header
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Whether the `delivered_on_time` column exists
    pub on_time: bool,
}

/// An inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range. A start after the end is allowed and matches no day.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the day lies in the range, both ends included
    #[must_use]
    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether the start comes after the end
    #[must_use]
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Whether any day of this range is also in `other`
    #[must_use]
    pub fn overlaps(&self, other: DateRange) -> bool {
        !self.is_inverted()
            && !other.is_inverted()
            && self.start <= other.end
            && other.start <= self.end
    }

    /// Pulls both ends inside `bounds`
    #[must_use]
    pub fn clamp_to(&self, bounds: DateRange) -> Self {
        Self {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }

    /// Works out the range to show from the days a user asked for.
    ///
    /// A missing end defaults to that end of `bounds`. A range that overlaps
    /// `bounds` is clamped to it; one that doesn't, or that is inverted, is kept
    /// as asked so it selects nothing instead of snapping to an edge day.
    #[must_use]
    pub fn resolve(bounds: DateRange, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let requested = Self::new(
            start.unwrap_or(bounds.start),
            end.unwrap_or(bounds.end),
        );
        if requested.overlaps(bounds) {
            requested.clamp_to(bounds)
        } else {
            requested
        }
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The full order table, read once and never modified
#[derive(Debug)]
pub struct Dataset {
    /// Rows sorted by purchase timestamp
    pub(crate) records: Vec<OrderRecord>,
    pub(crate) columns: Columns,
    pub(crate) bounds: DateRange,
}

impl Dataset {
    /// Sorts the records by purchase timestamp and works out the date bounds.
    ///
    /// # Errors
    /// [`Error::NoOrders`] if `records` is empty
    pub fn new(mut records: Vec<OrderRecord>, columns: Columns) -> Result<Self, Error> {
        records.sort_by_key(|record| record.purchased_at);
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.purchase_date(), last.purchase_date()),
            _ => return Err(Error::NoOrders),
        };
        Ok(Self {
            records,
            columns,
            bounds: DateRange::new(first, last),
        })
    }

    /// Returns all records in purchase order
    #[must_use]
    #[inline]
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Returns which optional columns were present
    #[must_use]
    #[inline]
    pub fn columns(&self) -> Columns {
        self.columns
    }

    /// Returns the first and last purchase dates
    #[must_use]
    #[inline]
    pub fn bounds(&self) -> DateRange {
        self.bounds
    }
}

/// Rows of a [`Dataset`] picked out by a date range
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub(crate) records: Vec<&'a OrderRecord>,
    pub(crate) columns: Columns,
}

impl<'a> Selection<'a> {
    /// Returns the selected records
    #[must_use]
    #[inline]
    pub fn records(&self) -> &[&'a OrderRecord] {
        &self.records
    }

    /// Returns the number of selected rows
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was selected
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Distinct orders placed on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyOrders {
    /// The calendar day
    pub day: NaiveDate,
    /// How many distinct orders were placed that day
    pub order_count: usize,
}

/// Number of rows for one customer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCount {
    /// State code
    pub state: String,
    /// Rows with that state
    pub customers: usize,
}

/// One slice of the on-time delivery pie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnTimeSlice {
    /// Value of the on-time flag
    pub label: String,
    /// Rows with that value
    pub rows: usize,
    /// Share of all flagged rows, in percent, with [`PERCENT_SCALE`] decimals
    pub percentage: Decimal,
}

/// A customer location in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
}
