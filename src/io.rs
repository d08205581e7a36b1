//! Helpers for reading the order data file

use std::{fs::File, io::Read, path::Path};

use csv::Trim;
use tracing::{debug, info};

use crate::{
    errors::Error,
    types::{Columns, Dataset, OrderRecord, ON_TIME_COLUMN, REQUIRED_COLUMNS},
};

/// Loads order records from a CSV-formatted stream.
///
/// Columns other than the ones the dashboard reads are ignored, and
/// `delivered_on_time` may be absent altogether.
///
/// Expects input data in this format (including header):
/// ```csv
/// order_id,customer_state,order_purchase_timestamp,order_delivered_customer_date,order_approved_at,geolocation_lat,geolocation_lng,delivered_on_time
/// e481f51c,SP,2017-10-02 10:56:33,2017-10-10 21:25:13,2017-10-02 11:07:15,-23.57,-46.58,True
/// 53cdb2fc,BA,2018-07-24 20:41:37,,2018-07-26 03:24:27,,,False
/// ```
///
/// # Errors
/// [`Error::MissingColumn`] when a required column is not in the header,
/// [`Error::Load`] when a row can't be read or holds a bad timestamp, and
/// [`Error::NoOrders`] when there are no rows.
pub fn load_orders_from_csv<R>(reader: R) -> Result<Dataset, Error>
where
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(Error::MissingColumn(missing));
    }
    let columns = Columns {
        on_time: headers.iter().any(|header| header == ON_TIME_COLUMN),
    };
    debug!(?columns, "order data header checked");

    let mut records = Vec::new();
    for record in csv_reader.deserialize() {
        let record: OrderRecord = record?;
        records.push(record);
    }
    let dataset = Dataset::new(records, columns)?;
    info!(
        rows = dataset.records().len(),
        bounds = %dataset.bounds(),
        "loaded order data"
    );
    Ok(dataset)
}

/// Opens the file at `path` and loads it with [`load_orders_from_csv`].
///
/// # Errors
/// [`Error::Open`] if the file can't be opened, otherwise as [`load_orders_from_csv`]
pub fn load_orders_from_path(path: &Path) -> Result<Dataset, Error> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_orders_from_csv(std::io::BufReader::new(file))
}
