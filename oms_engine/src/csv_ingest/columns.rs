use std::{collections::HashMap, str::FromStr};

use csv::StringRecord;
use thiserror::Error;
use uuid::Uuid;

use super::{sanitize_field, CsvIngestError};
use crate::db_types::{NewOrder, OrderId, Price};

pub const REQUIRED_COLUMNS: [&str; 7] = ["order_id", "sku_id", "hub_id", "seller_id", "tenant_id", "price", "quantity"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Column '{0}' is missing from the row")]
    MissingField(&'static str),
    #[error("Invalid value '{value}' in column '{column}'. {reason}")]
    InvalidField { column: &'static str, value: String, reason: String },
}

/// Where each required column lives in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    order_id: usize,
    sku_id: usize,
    hub_id: usize,
    seller_id: usize,
    tenant_id: usize,
    price: usize,
    quantity: usize,
}

impl ColumnMap {
    /// Builds the map from sanitised header names. Extra columns are ignored. If a name appears twice, the first
    /// occurrence wins.
    pub fn from_headers(headers: &[String]) -> Result<Self, CsvIngestError> {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.as_str()).or_insert(i);
        }
        let missing = REQUIRED_COLUMNS.iter().filter(|c| !index.contains_key(*c)).copied().collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(CsvIngestError::MissingColumns(missing.join(", ")));
        }
        let col = |name: &str| index.get(name).copied().unwrap_or_default();
        Ok(Self {
            order_id: col("order_id"),
            sku_id: col("sku_id"),
            hub_id: col("hub_id"),
            seller_id: col("seller_id"),
            tenant_id: col("tenant_id"),
            price: col("price"),
            quantity: col("quantity"),
        })
    }

    /// Maps a data row onto a new order. An empty `order_id` cell gets a freshly generated id.
    pub fn map_row(&self, record: &StringRecord) -> Result<NewOrder, RowError> {
        let order_id = match field(record, self.order_id, "order_id")?.as_str() {
            "" => OrderId::random(),
            s => parse(s, "order_id")?,
        };
        let order = NewOrder {
            order_id,
            sku_id: parse::<Uuid>(&field(record, self.sku_id, "sku_id")?, "sku_id")?,
            hub_id: parse::<Uuid>(&field(record, self.hub_id, "hub_id")?, "hub_id")?,
            seller_id: parse::<Uuid>(&field(record, self.seller_id, "seller_id")?, "seller_id")?,
            tenant_id: parse::<Uuid>(&field(record, self.tenant_id, "tenant_id")?, "tenant_id")?,
            quantity: parse::<i64>(&field(record, self.quantity, "quantity")?, "quantity")?,
            price: parse::<Price>(&field(record, self.price, "price")?, "price")?,
        };
        Ok(order)
    }
}

fn field(record: &StringRecord, index: usize, column: &'static str) -> Result<String, RowError> {
    record.get(index).map(sanitize_field).ok_or(RowError::MissingField(column))
}

fn parse<T>(value: &str, column: &'static str) -> Result<T, RowError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| RowError::InvalidField { column, value: value.to_string(), reason: e.to_string() })
}
