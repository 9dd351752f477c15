use chrono::{DateTime, Utc};

use crate::domain::Session;

const HEADER: &str = "id,title,goal,status,scheduled_minutes,active_elapsed_seconds,focus_score,created_at,start_time,ended_at";

/// Renders sessions as CSV, one row per session.
///
/// A pure formatting concern over the entity: no lifecycle logic happens
/// here. Timestamps are RFC 3339 with an explicit UTC offset.
pub fn sessions_to_csv(sessions: &[Session]) -> String {
    let mut output = String::from(HEADER);
    output.push('\n');

    for session in sessions {
        let row = [
            session.id.map(|id| id.to_string()).unwrap_or_default(),
            escape(&session.title),
            escape(&session.goal),
            session.status.to_string(),
            session.scheduled_minutes.to_string(),
            session.active_elapsed_seconds.to_string(),
            session.focus_score.to_string(),
            format_timestamp(Some(session.created_at)),
            format_timestamp(session.start_time),
            format_timestamp(session.ended_at),
        ];
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map(|value| value.to_rfc3339()).unwrap_or_default()
}

/// RFC 4180 quoting: only fields containing a separator, quote or newline
/// are wrapped, with inner quotes doubled.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_session(title: &str) -> Session {
        let created = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        Session::schedule(title, "goal", 30, created).unwrap()
    }

    #[test]
    fn empty_input_yields_header_only() {
        let csv = sessions_to_csv(&[]);

        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("id,title,goal,status"));
    }

    #[test]
    fn row_carries_utc_marked_timestamps() {
        let mut session = sample_session("Write parser");
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        session.start(start).unwrap();

        let csv = sessions_to_csv(&[session]);

        assert!(csv.contains("2025-03-03T10:00:00+00:00"));
    }

    #[test]
    fn titles_with_separators_are_quoted() {
        let session = sample_session("refactor, then test");

        let csv = sessions_to_csv(&[session]);

        assert!(csv.contains("\"refactor, then test\""));
    }

    #[test]
    fn quotes_inside_fields_are_doubled() {
        let session = sample_session(r#"the "big" rewrite"#);

        let csv = sessions_to_csv(&[session]);

        assert!(csv.contains(r#""the ""big"" rewrite""#));
    }

    #[test]
    fn unstarted_session_has_empty_timestamp_fields() {
        let csv = sessions_to_csv(&[sample_session("plain")]);
        let row = csv.lines().nth(1).unwrap();

        assert!(row.ends_with(",,"));
    }
}
