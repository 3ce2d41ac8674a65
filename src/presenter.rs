use crate::order::{Order, OrderStatus};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Success,
    Warning,
    Danger,
    Neutral,
}

impl ColorToken {
    pub fn hex(&self) -> &'static str {
        match self {
            ColorToken::Success => "#28a745",
            ColorToken::Warning => "#ffc107",
            ColorToken::Danger => "#dc3545",
            ColorToken::Neutral => "#6c757d",
        }
    }
}

/// Optional parts of an order's presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Detail,
    Qr,
    Map,
}

/// Badge color for a displayed status label. Only the exact Korean labels
/// are colored; fixture codes such as `delivered` are neutral like any other
/// unknown string.
pub fn status_color(status: &str) -> ColorToken {
    match OrderStatus::from_label(status) {
        Some(OrderStatus::Delivered) => ColorToken::Success,
        Some(OrderStatus::InTransit) => ColorToken::Warning,
        Some(OrderStatus::Cancelled) => ColorToken::Danger,
        None => ColorToken::Neutral,
    }
}

pub fn visible_sections(order: &Order) -> BTreeSet<Section> {
    let mut sections = BTreeSet::new();

    if order.status != OrderStatus::Cancelled {
        sections.insert(Section::Detail);
    }

    if order.status == OrderStatus::Delivered {
        sections.insert(Section::Qr);
        sections.insert(Section::Map);
    }

    sections
}

pub fn shows_estimated_delivery(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::InTransit | OrderStatus::Delivered)
}
