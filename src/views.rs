use crate::delivery::DeliveryRequestForm;
use crate::map::Station;
use crate::order::Order;
use crate::presenter::{Section, shows_estimated_delivery, status_color, visible_sections};
use crate::qr;
use crate::tracking::TrackingEvent;
use crate::util::format_date;
use askama::Template;
use tracing::warn;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "orders.html")]
pub struct OrdersPage {
    pub display_name: String,
    pub notices: Vec<String>,
    pub cards: Vec<OrderCard>,
    pub detail: Option<OrderDetail>,
}

#[derive(Template)]
#[template(path = "request.html")]
pub struct RequestPage {
    pub form: DeliveryRequestForm,
    pub min_pickup_date: String,
    pub error: Option<String>,
    pub success: Option<String>,
    pub summary: Vec<(&'static str, String)>,
}

/// One order in the tracking list.
pub struct OrderCard {
    pub id: String,
    pub company: String,
    pub logo: Option<String>,
    pub items: String,
    pub tracking_number: String,
    pub status: String,
    pub status_color: &'static str,
    pub estimated_delivery: Option<String>,
    pub show_detail: bool,
}

impl OrderCard {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            company: order.company.clone(),
            logo: order.logo.clone(),
            items: order.items.join(", "),
            tracking_number: order.tracking_number.clone(),
            status: order.status.to_string(),
            status_color: status_color(order.status.label()).hex(),
            estimated_delivery: shows_estimated_delivery(order.status)
                .then(|| format_date(order.estimated_delivery)),
            show_detail: visible_sections(order).contains(&Section::Detail),
        }
    }
}

/// Contents of the detail dialog.
pub struct OrderDetail {
    pub id: String,
    pub company: String,
    pub tracking_number: String,
    pub events: Vec<TrackingEvent>,
    pub qr: Option<QrView>,
    pub map: Option<MapView>,
}

pub struct QrView {
    pub image: Option<String>,
    pub error: Option<String>,
}

pub struct MapView {
    pub embed_url: String,
    pub latitude: String,
    pub longitude: String,
    pub label: String,
}

impl OrderDetail {
    /// `None` when the order offers no detail view.
    pub fn from_order(order: &Order, station: &Station) -> Option<Self> {
        let sections = visible_sections(order);
        if !sections.contains(&Section::Detail) {
            return None;
        }

        let qr = sections.contains(&Section::Qr).then(|| {
            match qr::generate_data_uri(&order.qr_payload.to_string()) {
                Ok(uri) => QrView {
                    image: Some(uri),
                    error: None,
                },
                Err(err) => {
                    warn!(error = %err, order_id = %order.id, "QR code generation failed");
                    QrView {
                        image: None,
                        error: Some(format!("QR 코드 생성 중 오류 발생: {err}")),
                    }
                }
            }
        });

        let map = sections.contains(&Section::Map).then(|| MapView {
            embed_url: station.embed_url(),
            latitude: station.latitude.to_string(),
            longitude: station.longitude.to_string(),
            label: station.label.clone(),
        });

        Some(Self {
            id: order.id.clone(),
            company: order.company.clone(),
            tracking_number: order.tracking_number.clone(),
            events: order.tracking_events.clone(),
            qr,
            map,
        })
    }
}

impl RequestPage {
    pub fn new(form: DeliveryRequestForm, min_pickup_date: String) -> Self {
        Self {
            form,
            min_pickup_date,
            error: None,
            success: None,
            summary: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderStatus, QrPayload};
    use chrono::NaiveDate;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "ORD-002".into(),
            company: "당근마켓".into(),
            logo: None,
            status,
            estimated_delivery: NaiveDate::from_ymd_opt(2024, 5, 29).unwrap(),
            items: vec!["F-35 피규어".into(), "스티커".into()],
            tracking_number: "1Z999AA10123456783".into(),
            qr_payload: QrPayload::Code(9),
            tracking_events: vec![TrackingEvent {
                timestamp: "2024-06-01 14:30".into(),
                location: "인천 송도 제1 스테이션".into(),
                status: "배달 완료".into(),
            }],
        }
    }

    #[test]
    fn card_for_delivered_order() {
        let card = OrderCard::from_order(&order(OrderStatus::Delivered));
        assert_eq!(card.items, "F-35 피규어, 스티커");
        assert_eq!(card.status, "배달 완료");
        assert_eq!(card.status_color, "#28a745");
        assert_eq!(card.estimated_delivery.as_deref(), Some("2024-05-29"));
        assert!(card.show_detail);
    }

    #[test]
    fn card_for_cancelled_order_hides_estimate_and_detail() {
        let card = OrderCard::from_order(&order(OrderStatus::Cancelled));
        assert_eq!(card.status_color, "#dc3545");
        assert!(card.estimated_delivery.is_none());
        assert!(!card.show_detail);
    }

    #[test]
    fn delivered_detail_has_qr_and_map() {
        let detail = OrderDetail::from_order(&order(OrderStatus::Delivered), &Station::default()).unwrap();
        let qr = detail.qr.unwrap();
        assert!(qr.image.unwrap().starts_with("data:image/png;base64,"));
        assert!(qr.error.is_none());
        assert_eq!(detail.map.unwrap().label, "스테이션 위치");
        assert_eq!(detail.events.len(), 1);
    }

    #[test]
    fn in_transit_detail_has_no_qr_or_map() {
        let detail = OrderDetail::from_order(&order(OrderStatus::InTransit), &Station::default()).unwrap();
        assert!(detail.qr.is_none());
        assert!(detail.map.is_none());
    }

    #[test]
    fn cancelled_order_has_no_detail() {
        assert!(OrderDetail::from_order(&order(OrderStatus::Cancelled), &Station::default()).is_none());
    }
}
