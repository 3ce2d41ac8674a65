use crate::util::{TIMESTAMP_FORMAT, format_timestamp, localize, parse_timestamp};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One timestamped milestone in an order's delivery history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Naive local time, `YYYY-MM-DD HH:MM`.
    pub timestamp: String,
    pub location: String,
    pub status: String,
}

/// A timestamp that could not be parsed and was replaced with the current
/// time-of-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTimestamp {
    pub index: usize,
    pub raw: String,
}

impl MalformedTimestamp {
    /// Notice shown to the user.
    pub fn message(&self) -> String {
        format!("잘못된 날짜 형식: {}", self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub events: Vec<TrackingEvent>,
    pub warnings: Vec<MalformedTimestamp>,
}

/// Current wall-clock time in the given fixed offset.
pub fn now_in(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// The calendar date `offset_days` after (or before, when negative) `now`.
pub fn base_date(now: &DateTime<FixedOffset>, offset_days: i64) -> NaiveDate {
    let today = now.date_naive();
    let days = Days::new(offset_days.unsigned_abs());
    let shifted = if offset_days >= 0 {
        today.checked_add_days(days)
    } else {
        today.checked_sub_days(days)
    };
    shifted.unwrap_or(today)
}

/// Move every event onto `base_date`, keeping its time-of-day.
///
/// `now` supplies both the zone attached to each result and the
/// time-of-day substituted for timestamps that fail to parse. A malformed
/// timestamp never drops the event or aborts the batch; it is reported in
/// [`Normalized::warnings`] instead. Order and length are preserved.
pub fn normalize(
    events: &[TrackingEvent],
    base_date: NaiveDate,
    now: &DateTime<FixedOffset>,
) -> Normalized {
    let offset = *now.offset();
    let mut warnings = Vec::new();

    let events = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let time = match parse_timestamp(&event.timestamp) {
                Ok(parsed) => parsed.time(),
                Err(err) => {
                    warn!(
                        error = %err,
                        timestamp = %event.timestamp,
                        location = %event.location,
                        "Malformed tracking timestamp, using current time"
                    );
                    warnings.push(MalformedTimestamp {
                        index,
                        raw: event.timestamp.clone(),
                    });
                    now.time()
                }
            };

            let local = base_date.and_time(time);
            let timestamp = match localize(local, offset) {
                Some(zoned) => format_timestamp(&zoned),
                None => {
                    warn!(base_date = %base_date, "Base date out of range for offset, keeping local time");
                    local.format(TIMESTAMP_FORMAT).to_string()
                }
            };

            TrackingEvent {
                timestamp,
                ..event.clone()
            }
        })
        .collect();

    Normalized { events, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::TIME_FORMAT;
    use chrono::TimeZone;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn event(timestamp: &str, location: &str, status: &str) -> TrackingEvent {
        TrackingEvent {
            timestamp: timestamp.into(),
            location: location.into(),
            status: status.into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_now() -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(2024, 5, 30, 17, 5, 42).unwrap()
    }

    #[test]
    fn rewrites_date_and_keeps_time() {
        let input = vec![event("2024-11-18 09:30", "A", "접수")];
        let result = normalize(&input, date(2024, 6, 1), &fixed_now());

        assert_eq!(result.events, vec![event("2024-06-01 09:30", "A", "접수")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn preserves_order_and_length() {
        let input = vec![
            event("2024-11-18 09:30", "서울 물류센터", "상품 접수"),
            event("2024-03-17 13:45", "인천 드론 배송", "출고 준비"),
            event("2024-03-17 14:01", "인천 송도 제1 스테이션", "배송 중"),
        ];
        let result = normalize(&input, date(2024, 6, 1), &fixed_now());

        let stamps: Vec<_> = result.events.iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec!["2024-06-01 09:30", "2024-06-01 13:45", "2024-06-01 14:01"]
        );
        let locations: Vec<_> = result.events.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["서울 물류센터", "인천 드론 배송", "인천 송도 제1 스테이션"]
        );
    }

    #[test]
    fn idempotent_for_same_base_date() {
        let input = vec![
            event("2024-03-14 11:20", "용현동 판매자", "상품 발송"),
            event("2024-03-16 14:30", "인천 송도 제1 스테이션", "배달 완료"),
        ];
        let base = date(2025, 12, 31);
        let once = normalize(&input, base, &fixed_now());
        let twice = normalize(&once.events, base, &fixed_now());

        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_timestamp_falls_back_to_now() {
        let input = vec![
            event("yesterday-ish", "X", "?"),
            event("2024-03-15 10:00", "주문 취소", "고객 요청 취소"),
        ];
        let now = fixed_now();
        let result = normalize(&input, date(2024, 6, 1), &now);

        assert_eq!(result.events.len(), 2);
        assert_eq!(
            result.events[0].timestamp,
            format!("2024-06-01 {}", now.format(TIME_FORMAT))
        );
        assert_eq!(result.events[0].location, "X");
        assert_eq!(result.events[1].timestamp, "2024-06-01 10:00");
        assert_eq!(
            result.warnings,
            vec![MalformedTimestamp {
                index: 0,
                raw: "yesterday-ish".into()
            }]
        );
        assert_eq!(result.warnings[0].message(), "잘못된 날짜 형식: yesterday-ish");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = normalize(&[], date(2024, 6, 1), &fixed_now());
        assert!(result.events.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn extreme_base_dates_keep_time_of_day() {
        let input = vec![event("2024-11-18 09:30", "A", "접수")];

        let earliest = normalize(&input, NaiveDate::MIN, &fixed_now());
        assert_eq!(earliest.events.len(), 1);
        assert!(earliest.events[0].timestamp.ends_with(" 09:30"));
        assert!(earliest.warnings.is_empty());

        let latest = normalize(&input, NaiveDate::MAX, &fixed_now());
        assert!(latest.events[0].timestamp.ends_with(" 09:30"));
    }

    #[test]
    fn base_date_adds_days_across_month_end() {
        let now = kst().with_ymd_and_hms(2024, 2, 28, 23, 59, 0).unwrap();
        assert_eq!(base_date(&now, 2), date(2024, 3, 1));
    }

    #[test]
    fn base_date_subtracts_days() {
        assert_eq!(base_date(&fixed_now(), -1), date(2024, 5, 29));
    }

    #[test]
    fn base_date_uses_local_calendar_day() {
        // 2024-05-30 20:00 UTC is already 2024-05-31 in KST.
        let now = Utc.with_ymd_and_hms(2024, 5, 30, 20, 0, 0).unwrap().with_timezone(&kst());
        assert_eq!(base_date(&now, 0), date(2024, 5, 31));
    }
}
