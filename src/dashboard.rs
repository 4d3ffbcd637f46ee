//! Dashboard statistics over joined and hosted events.
//!
//! Plain synchronous aggregation over lists the gateway already
//! fetched; nothing here touches the network.

use crate::api::types::{Event, EventStatus};
use chrono::{Duration, NaiveDate};

/// How far ahead an event may lie and still count as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// An event is upcoming when all three hold: its date is strictly after
/// today, it lies within the 30-day window, and it is still open.
pub fn is_upcoming(event: &Event, today: NaiveDate) -> bool {
    event.date > today
        && event.date <= today + Duration::days(UPCOMING_WINDOW_DAYS)
        && event.status == EventStatus::Open
}

/// Joined events qualifying as upcoming, soonest first.
pub fn upcoming_events<'a>(joined: &'a [Event], today: NaiveDate) -> Vec<&'a Event> {
    let mut upcoming: Vec<&Event> = joined
        .iter()
        .filter(|event| is_upcoming(event, today))
        .collect();
    upcoming.sort_by_key(|event| event.date);
    upcoming
}

/// Aggregated dashboard counters.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub joined: usize,
    pub upcoming: usize,
    /// Joined events that ran to completion.
    pub attended: usize,
    pub hosted: usize,
    /// Total fees across joined events.
    pub fees_paid: f64,
}

pub fn compute_stats(joined: &[Event], hosted: &[Event], today: NaiveDate) -> DashboardStats {
    DashboardStats {
        joined: joined.len(),
        upcoming: joined.iter().filter(|e| is_upcoming(e, today)).count(),
        attended: joined
            .iter()
            .filter(|e| e.status == EventStatus::Completed)
            .count(),
        hosted: hosted.len(),
        fees_paid: joined.iter().map(|e| e.fee).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::HostRef;

    fn event(date: &str, status: EventStatus) -> Event {
        Event {
            id: "e".into(),
            title: "T".into(),
            description: String::new(),
            category: String::new(),
            date: date.parse().unwrap(),
            location: String::new(),
            status,
            capacity: 10,
            attendee_count: 0,
            fee: 3.5,
            host: HostRef {
                id: "h".into(),
                name: String::new(),
            },
            participants: Vec::new(),
            reviews: Vec::new(),
        }
    }

    fn today() -> NaiveDate {
        "2024-06-01".parse().unwrap()
    }

    #[test]
    fn open_event_within_window_is_upcoming() {
        assert!(is_upcoming(&event("2024-06-15", EventStatus::Open), today()));
    }

    #[test]
    fn event_outside_window_is_excluded() {
        assert!(!is_upcoming(&event("2024-07-15", EventStatus::Open), today()));
    }

    #[test]
    fn cancelled_event_is_excluded() {
        assert!(!is_upcoming(
            &event("2024-06-10", EventStatus::Cancelled),
            today()
        ));
    }

    #[test]
    fn today_itself_is_not_upcoming() {
        // Strictly after today
        assert!(!is_upcoming(&event("2024-06-01", EventStatus::Open), today()));
        assert!(is_upcoming(&event("2024-06-02", EventStatus::Open), today()));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        // 2024-07-01 is exactly 30 days out
        assert!(is_upcoming(&event("2024-07-01", EventStatus::Open), today()));
        assert!(!is_upcoming(&event("2024-07-02", EventStatus::Open), today()));
    }

    #[test]
    fn upcoming_list_is_sorted_soonest_first() {
        let joined = vec![
            event("2024-06-20", EventStatus::Open),
            event("2024-06-05", EventStatus::Open),
            event("2024-06-10", EventStatus::Closed),
        ];
        let upcoming = upcoming_events(&joined, today());
        let dates: Vec<_> = upcoming.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-05", "2024-06-20"]);
    }

    #[test]
    fn stats_count_each_bucket() {
        let joined = vec![
            event("2024-06-15", EventStatus::Open),
            event("2024-07-15", EventStatus::Open),
            event("2024-05-01", EventStatus::Completed),
        ];
        let hosted = vec![event("2024-06-20", EventStatus::Open)];

        let stats = compute_stats(&joined, &hosted, today());
        assert_eq!(stats.joined, 3);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.attended, 1);
        assert_eq!(stats.hosted, 1);
        assert!((stats.fees_paid - 10.5).abs() < f64::EPSILON);
    }
}
