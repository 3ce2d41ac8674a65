use crate::util::{DATE_FORMAT, TIME_FORMAT};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use thiserror::Error;

pub const SUBMITTED_MESSAGE: &str = "배송 요청이 성공적으로 제출되었습니다!";

/// Raw delivery request form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryRequestForm {
    pub sender_name: String,
    pub sender_address: String,
    pub sender_contact: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_contact: String,
    pub package_description: String,
    pub package_weight: String,
    pub pickup_date: String,
    pub pickup_time: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Labels of the empty fields, in form order.
    #[error("모든 필드를 올바르게 입력해주세요. (미입력: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A request that passed presence validation. Nothing is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub sender_name: String,
    pub sender_address: String,
    pub sender_contact: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub recipient_contact: String,
    pub package_description: String,
    pub package_weight: String,
    pub pickup_date: String,
    pub pickup_time: String,
}

impl DeliveryRequestForm {
    /// A blank form with pickup defaulting to `now`.
    pub fn blank(now: &DateTime<FixedOffset>) -> Self {
        let mut form = Self::default();
        form.fill_pickup_defaults(now);
        form
    }

    /// Fill an empty pickup date/time with `now`.
    pub fn fill_pickup_defaults(&mut self, now: &DateTime<FixedOffset>) {
        if self.pickup_date.trim().is_empty() {
            self.pickup_date = now.format(DATE_FORMAT).to_string();
        }
        if self.pickup_time.trim().is_empty() {
            self.pickup_time = now.format(TIME_FORMAT).to_string();
        }
    }

    /// Presence check only: every required field must be non-empty.
    /// Values are accepted and echoed back exactly as typed.
    pub fn validate(&self) -> Result<DeliveryRequest, ValidationError> {
        let required = [
            ("송신인 이름", &self.sender_name),
            ("송신인 주소", &self.sender_address),
            ("송신인 연락처", &self.sender_contact),
            ("수신인 이름", &self.recipient_name),
            ("수신인 주소", &self.recipient_address),
            ("수신인 연락처", &self.recipient_contact),
            ("내용물", &self.package_description),
            ("무게 (kg)", &self.package_weight),
        ];

        let missing: Vec<_> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| *label)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(DeliveryRequest {
            sender_name: self.sender_name.clone(),
            sender_address: self.sender_address.clone(),
            sender_contact: self.sender_contact.clone(),
            recipient_name: self.recipient_name.clone(),
            recipient_address: self.recipient_address.clone(),
            recipient_contact: self.recipient_contact.clone(),
            package_description: self.package_description.clone(),
            package_weight: self.package_weight.clone(),
            pickup_date: self.pickup_date.clone(),
            pickup_time: self.pickup_time.clone(),
        })
    }
}

impl DeliveryRequest {
    /// Labelled values echoed back after submission, in form order.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("송신인 이름", self.sender_name.clone()),
            ("송신인 주소", self.sender_address.clone()),
            ("송신인 연락처", self.sender_contact.clone()),
            ("수신인 이름", self.recipient_name.clone()),
            ("수신인 주소", self.recipient_address.clone()),
            ("수신인 연락처", self.recipient_contact.clone()),
            ("내용물", self.package_description.clone()),
            ("무게 (kg)", self.package_weight.clone()),
            ("픽업 날짜", self.pickup_date.clone()),
            ("픽업 시간", self.pickup_time.clone()),
        ]
    }
}
