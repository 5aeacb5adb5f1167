use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use oms_engine::{
    db_types::{NewOrder, OrderId, OrderStatusType, Price},
    order_objects::OrderQueryFilter,
    StoreError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The body of `POST /api/v1/orders`. The tenant comes from the `X-Tenant-ID` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub sku_id: Uuid,
    pub hub_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: i64,
    pub price: Price,
}

impl CreateOrderRequest {
    pub fn into_new_order(self, tenant_id: Uuid) -> NewOrder {
        let order = NewOrder::new(self.sku_id, self.hub_id, self.seller_id, tenant_id, self.quantity, self.price);
        match self.order_id {
            Some(id) => order.with_order_id(id),
            None => order,
        }
    }
}

/// The body of the bulk order and upload endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePathRequest {
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOrderResponse {
    pub success: bool,
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWebhookRequest {
    pub url: String,
}

/// Query parameters for `GET /api/v1/orders`. Dates are either RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A
/// plain end date includes the whole day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    pub seller_id: Option<Uuid>,
    pub status: Option<OrderStatusType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl OrderSearchParams {
    pub fn into_filter(self, tenant_id: Option<Uuid>) -> Result<OrderQueryFilter, StoreError> {
        let mut filter = OrderQueryFilter::default();
        if let Some(tenant_id) = tenant_id {
            filter = filter.with_tenant_id(tenant_id);
        }
        if let Some(seller_id) = self.seller_id {
            filter = filter.with_seller_id(seller_id);
        }
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(start) = self.start_date {
            filter = filter.since(parse_date(&start, NaiveTime::default())?)?;
        }
        if let Some(end) = self.end_date {
            let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
            filter = filter.until(parse_date(&end, end_of_day)?)?;
        }
        if let (Some(since), Some(until)) = (filter.since, filter.until) {
            if since > until {
                return Err(StoreError::QueryError("The start date is after the end date".to_string()));
            }
        }
        Ok(filter)
    }
}

fn parse_date(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| Utc.from_utc_datetime(&d.and_time(time_of_day)))
        .map_err(|e| StoreError::QueryError(format!("'{value}' is not a valid date. {e}")))
}
