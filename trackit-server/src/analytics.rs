//! Attendance statistics fed to the analytics insight

use serde::Serialize;
use trackit_common::db::models::{Attendance, AttendanceMethod, AttendanceStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_records: usize,
    pub present_count: usize,
    pub absent_count: usize,
    pub late_count: usize,
    pub excused_count: usize,
    pub facial_recognition_count: usize,
    /// Mean over records that carry a confidence; `None` when none do
    pub average_confidence: Option<f64>,
    /// (present + excused) / total × 100
    pub attendance_rate: f64,
}

impl AttendanceStats {
    pub fn from_records(records: &[Attendance]) -> Self {
        let count_status = |status: AttendanceStatus| {
            records
                .iter()
                .filter(|r| r.status == status.as_str())
                .count()
        };

        let present_count = count_status(AttendanceStatus::Present);
        let excused_count = count_status(AttendanceStatus::Excused);

        let confidences: Vec<f64> = records.iter().filter_map(|r| r.confidence).collect();
        let average_confidence = (!confidences.is_empty())
            .then(|| confidences.iter().sum::<f64>() / confidences.len() as f64);

        let total_records = records.len();
        let attendance_rate = if total_records == 0 {
            0.0
        } else {
            (present_count + excused_count) as f64 / total_records as f64 * 100.0
        };

        Self {
            total_records,
            present_count,
            absent_count: count_status(AttendanceStatus::Absent),
            late_count: count_status(AttendanceStatus::Late),
            excused_count,
            facial_recognition_count: records
                .iter()
                .filter(|r| r.method == AttendanceMethod::FacialRecognition.as_str())
                .count(),
            average_confidence,
            attendance_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, method: &str, confidence: Option<f64>) -> Attendance {
        Attendance {
            id: "a".into(),
            session_id: "s".into(),
            student_id: "u".into(),
            status: status.into(),
            method: method.into(),
            confidence,
            check_in_time: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_counts_and_rate() {
        let records = vec![
            record("PRESENT", "FACIAL_RECOGNITION", Some(90.0)),
            record("PRESENT", "MANUAL", None),
            record("ABSENT", "MANUAL", None),
            record("EXCUSED", "MANUAL", None),
            record("LATE", "FACIAL_RECOGNITION", Some(80.0)),
        ];
        let stats = AttendanceStats::from_records(&records);

        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.present_count, 2);
        assert_eq!(stats.absent_count, 1);
        assert_eq!(stats.late_count, 1);
        assert_eq!(stats.excused_count, 1);
        assert_eq!(stats.facial_recognition_count, 2);
        assert_eq!(stats.average_confidence, Some(85.0));
        assert!((stats.attendance_rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_confidence_serializes_null() {
        let stats = AttendanceStats::from_records(&[record("ABSENT", "MANUAL", None)]);
        let value = serde_json::to_value(&stats).unwrap();
        assert!(value["averageConfidence"].is_null());
        assert_eq!(value["attendanceRate"], 0.0);
    }
}
