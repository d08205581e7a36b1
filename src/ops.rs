use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    errors::Error,
    types::{
        DailyOrders, Dataset, DateRange, MapPoint, OnTimeSlice, OrderId, Selection, StateCount,
        ON_TIME_COLUMN, PERCENT_SCALE,
    },
};

impl Dataset {
    /// Picks out the rows purchased within `range`, comparing calendar days only.
    ///
    /// An inverted range selects nothing.
    #[must_use]
    pub fn filter(&self, range: DateRange) -> Selection<'_> {
        Selection {
            records: self
                .records
                .iter()
                .filter(|record| range.contains(record.purchase_date()))
                .collect(),
            columns: self.columns,
        }
    }
}

impl<'a> Selection<'a> {
    /// Narrows the selection further. Filtering twice with one range is the same as once.
    #[must_use]
    pub fn filter(&self, range: DateRange) -> Selection<'a> {
        Selection {
            records: self
                .records
                .iter()
                .copied()
                .filter(|record| range.contains(record.purchase_date()))
                .collect(),
            columns: self.columns,
        }
    }

    /// Counts distinct orders per purchase day, in ascending day order.
    ///
    /// Only days with at least one order appear.
    #[must_use]
    pub fn daily_orders(&self) -> Vec<DailyOrders> {
        let mut days: BTreeMap<_, HashSet<&OrderId>> = BTreeMap::new();
        for record in &self.records {
            days.entry(record.purchase_date())
                .or_default()
                .insert(record.order_id());
        }
        days.into_iter()
            .map(|(day, orders)| DailyOrders {
                day,
                order_count: orders.len(),
            })
            .collect()
    }

    /// Counts rows per customer state, most frequent first.
    ///
    /// States with equal counts are ordered by name.
    #[must_use]
    pub fn customers_by_state(&self) -> Vec<StateCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.customer_state()).or_default() += 1;
        }
        let mut states: Vec<StateCount> = counts
            .into_iter()
            .map(|(state, customers)| StateCount {
                state: state.to_owned(),
                customers,
            })
            .collect();
        states.sort_by(|a, b| {
            b.customers
                .cmp(&a.customers)
                .then_with(|| a.state.cmp(&b.state))
        });
        states
    }

    /// Splits the rows by their on-time flag, most frequent value first.
    ///
    /// Rows without a flag are left out of the shares.
    /// # Errors
    /// [`Error::MissingColumn`] if the data has no `delivered_on_time` column
    pub fn on_time_ratio(&self) -> Result<Vec<OnTimeSlice>, Error> {
        if !self.columns.on_time {
            return Err(Error::MissingColumn(ON_TIME_COLUMN));
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for label in self
            .records
            .iter()
            .filter_map(|record| record.delivered_on_time())
        {
            *counts.entry(label).or_default() += 1;
        }
        let flagged: usize = counts.values().sum();
        let mut slices: Vec<OnTimeSlice> = counts
            .into_iter()
            .map(|(label, rows)| OnTimeSlice {
                label: label.to_owned(),
                rows,
                percentage: percentage(rows, flagged),
            })
            .collect();
        slices.sort_by(|a, b| b.rows.cmp(&a.rows).then_with(|| a.label.cmp(&b.label)));
        Ok(slices)
    }

    /// Returns the coordinates of every row that has both of them
    #[must_use]
    pub fn map_points(&self) -> Vec<MapPoint> {
        self.records
            .iter()
            .filter_map(|record| record.location())
            .collect()
    }

    /// Counts distinct orders in the selection
    #[must_use]
    pub fn distinct_orders(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.order_id())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Sums the per-day counts into the dashboard's "total orders" figure
#[must_use]
pub fn total_orders(daily: &[DailyOrders]) -> usize {
    daily.iter().map(|day| day.order_count).sum()
}

/// `part` as a percentage of `whole` to [`PERCENT_SCALE`] decimals, ties to even
fn percentage(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::new(0, PERCENT_SCALE);
    }
    let mut share = (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
        .round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointNearestEven);
    // keep the trailing zero of whole numbers, e.g. 50.0
    share.rescale(PERCENT_SCALE);
    share
}
