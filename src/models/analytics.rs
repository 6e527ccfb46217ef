use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single patient lifecycle event recorded by the analytics service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "patientName")]
    pub patient_name: String,
    #[serde(rename = "patientEmail")]
    pub patient_email: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub timestamp: String,
}

/// Aggregate event statistics from the analytics service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsSummary {
    #[serde(rename = "totalEvents")]
    pub total_events: i64,
    #[serde(rename = "eventsByType", default)]
    pub events_by_type: HashMap<String, i64>,
    #[serde(rename = "uniquePatients")]
    pub unique_patients: i64,
    #[serde(rename = "eventsLastHour")]
    pub events_last_hour: i64,
    #[serde(rename = "eventsLast24Hours")]
    pub events_last_24_hours: i64,
}

impl AnalyticsSummary {
    /// Event type counts, largest first, for the summary panel.
    pub fn top_event_types(&self) -> Vec<(&str, i64)> {
        let mut counts: Vec<(&str, i64)> = self
            .events_by_type
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }
}

/// Which slice of the event stream the analytics tab is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    Recent,
    Patient(String),
    EventType(String),
}

impl EventFilter {
    pub fn label(&self) -> String {
        match self {
            EventFilter::Recent => "recent".to_string(),
            EventFilter::Patient(id) => format!("patient {}", id),
            EventFilter::EventType(kind) => format!("type {}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_deserializes_wire_names() {
        let json = r#"{"totalEvents":42,"eventsByType":{"PATIENT_CREATED":30,"PATIENT_DELETED":12},"uniquePatients":25,"eventsLastHour":3,"eventsLast24Hours":17}"#;
        let summary: AnalyticsSummary = serde_json::from_str(json).expect("summary json");
        assert_eq!(summary.total_events, 42);
        assert_eq!(summary.events_last_24_hours, 17);
        assert_eq!(summary.events_by_type["PATIENT_CREATED"], 30);
    }

    #[test]
    fn test_top_event_types_sorted_descending() {
        let mut summary = AnalyticsSummary::default();
        summary.events_by_type.insert("PATIENT_UPDATED".to_string(), 5);
        summary.events_by_type.insert("PATIENT_CREATED".to_string(), 9);
        summary.events_by_type.insert("PATIENT_DELETED".to_string(), 5);

        let top = summary.top_event_types();
        assert_eq!(top[0], ("PATIENT_CREATED", 9));
        // Ties break alphabetically so the ordering is stable
        assert_eq!(top[1], ("PATIENT_DELETED", 5));
        assert_eq!(top[2], ("PATIENT_UPDATED", 5));
    }
}
