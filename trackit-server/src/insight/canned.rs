//! Fixed insight objects, no external calls

use async_trait::async_trait;

use super::{
    AttendanceAnalysis, FaceAnalysis, Insight, InsightProvider, InsightRequest, ProviderError,
};

pub fn face_analysis() -> FaceAnalysis {
    FaceAnalysis {
        is_face_detected: true,
        confidence: 94.2,
        quality: "good".to_string(),
        analysis: "Clear frontal face image with good lighting and contrast".to_string(),
    }
}

pub fn attendance_analysis() -> AttendanceAnalysis {
    AttendanceAnalysis {
        summary: "Attendance analysis completed".to_string(),
        insights: vec![
            "Regular attendance patterns detected".to_string(),
            "AI facial recognition working effectively".to_string(),
        ],
        recommendations: vec![
            "Continue current attendance tracking".to_string(),
            "Consider early intervention for at-risk students".to_string(),
        ],
        risk_level: "low".to_string(),
        trends: "Stable attendance patterns".to_string(),
        prediction: "Expected to maintain current attendance levels".to_string(),
    }
}

/// Default provider: the same analysis regardless of input
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedInsightProvider;

#[async_trait]
impl InsightProvider for CannedInsightProvider {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn analyze(&self, request: &InsightRequest) -> Result<Insight, ProviderError> {
        Ok(match request {
            InsightRequest::Face { .. } => Insight::Face(face_analysis()),
            InsightRequest::Attendance { .. } => Insight::Attendance(attendance_analysis()),
        })
    }
}
