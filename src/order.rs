use crate::assets;
use crate::tracking::{self, TrackingEvent};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const SAMPLE_ORDERS: &str = include_str!("../fixtures/orders.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::InTransit => "배송중",
            OrderStatus::Delivered => "배달 완료",
            OrderStatus::Cancelled => "취소됨",
        }
    }

    /// Exact match on the display label only; codes are not accepted.
    pub fn from_label(s: &str) -> Option<Self> {
        [
            OrderStatus::InTransit,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ]
        .into_iter()
        .find(|status| status.label() == s)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(status) = Self::from_label(s) {
            return Ok(status);
        }
        match s {
            "in_transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(anyhow::anyhow!("Unknown order status: {other}")),
        }
    }
}

/// Data encoded into the delivery confirmation QR code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QrPayload {
    Code(i64),
    Text(String),
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrPayload::Code(code) => write!(f, "{code}"),
            QrPayload::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub company: String,
    /// Logo as a data URI, if the asset could be loaded.
    pub logo: Option<String>,
    pub status: OrderStatus,
    pub estimated_delivery: NaiveDate,
    pub items: Vec<String>,
    pub tracking_number: String,
    pub qr_payload: QrPayload,
    pub tracking_events: Vec<TrackingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct OrderFixtures {
    pub orders: Vec<OrderFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderFixture {
    pub id: String,
    pub company: String,
    /// File name under the assets directory.
    #[serde(default)]
    pub logo: Option<String>,
    pub status: String,
    /// Days relative to today that the order is expected to arrive.
    #[serde(default)]
    pub estimated_delivery_offset_days: i64,
    #[serde(default)]
    pub items: Vec<String>,
    pub tracking_number: String,
    #[serde(default)]
    pub qr_payload: Option<QrPayload>,
    #[serde(default)]
    pub tracking_events: Vec<TrackingEvent>,
}

impl OrderFixtures {
    /// Parse fixtures from JSON and check every status up front, so a typo
    /// surfaces at startup instead of on the first page view.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixtures: Self = serde_json::from_str(json).context("Invalid order fixture JSON")?;

        for order in &fixtures.orders {
            OrderStatus::from_str(&order.status)
                .with_context(|| format!("Invalid status for order {}", order.id))?;
        }

        Ok(fixtures)
    }

    /// Load fixtures from `path`, or the bundled sample orders when unset.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read order fixtures at {path}"))?;
                Self::from_json(&json)
            }
            None => Self::from_json(SAMPLE_ORDERS),
        }
    }
}

/// Orders for one session, plus any notices raised while building them.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub orders: Vec<Order>,
    pub notices: Vec<String>,
}

impl OrderBook {
    /// Build every order once, normalizing tracking dates onto
    /// `now + base_date_offset_days`.
    ///
    /// Missing logos and malformed timestamps become notices; neither stops
    /// the remaining orders from being built.
    pub fn build(
        fixtures: &OrderFixtures,
        assets_dir: &Path,
        now: &DateTime<FixedOffset>,
        base_date_offset_days: i64,
    ) -> Result<Self> {
        let base = tracking::base_date(now, base_date_offset_days);
        let mut book = OrderBook::default();

        for fixture in &fixtures.orders {
            let status = OrderStatus::from_str(&fixture.status)
                .with_context(|| format!("Invalid status for order {}", fixture.id))?;

            let logo = match &fixture.logo {
                Some(file) => match assets::load_data_uri(&assets_dir.join(file)) {
                    Ok(uri) => Some(uri),
                    Err(err) => {
                        warn!(error = %err, order_id = %fixture.id, "Failed to load order logo");
                        book.notices.push(err.to_string());
                        None
                    }
                },
                None => None,
            };

            let normalized = tracking::normalize(&fixture.tracking_events, base, now);
            book.notices
                .extend(normalized.warnings.iter().map(|w| w.message()));

            let qr_payload = fixture.qr_payload.clone().unwrap_or_else(|| {
                QrPayload::Text(format!("물류 스테이션 번호: {}", fixture.tracking_number))
            });

            book.orders.push(Order {
                id: fixture.id.clone(),
                company: fixture.company.clone(),
                logo,
                status,
                estimated_delivery: tracking::base_date(now, fixture.estimated_delivery_offset_days),
                items: fixture.items.clone(),
                tracking_number: fixture.tracking_number.clone(),
                qr_payload,
                tracking_events: normalized.events,
            });
        }

        debug!(
            orders = book.orders.len(),
            notices = book.notices.len(),
            base_date = %base,
            "Order book built"
        );

        Ok(book)
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }
}
