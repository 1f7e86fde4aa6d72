//! Insight providers behind the AI endpoints
//!
//! The HTTP layer only ever talks to [`InsightProvider`]. Providers may
//! fail; handlers fall back to the canned analysis when they do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod canned;
pub mod completion;

pub use canned::CannedInsightProvider;
pub use completion::CompletionInsightProvider;

/// Insight provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider configuration error: {0}")]
    Config(String),
}

/// Who an attendance analysis is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisTarget {
    Student,
    Class,
}

/// What to analyze
#[derive(Debug, Clone)]
pub enum InsightRequest {
    /// Face image submitted for check-in
    Face { session_id: String, image_data: String },
    /// Aggregated attendance statistics
    Attendance {
        target: AnalysisTarget,
        stats: Value,
        time_range: Option<String>,
    },
}

/// Result of a face image analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysis {
    pub is_face_detected: bool,
    /// 0-100
    pub confidence: f64,
    /// good / fair / poor
    pub quality: String,
    pub analysis: String,
}

/// Narrative analysis of attendance statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceAnalysis {
    pub summary: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    /// low / medium / high
    pub risk_level: String,
    pub trends: String,
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    Face(FaceAnalysis),
    Attendance(AttendanceAnalysis),
}

impl Insight {
    pub fn into_face(self) -> Option<FaceAnalysis> {
        match self {
            Insight::Face(face) => Some(face),
            Insight::Attendance(_) => None,
        }
    }

    pub fn into_attendance(self) -> Option<AttendanceAnalysis> {
        match self {
            Insight::Attendance(analysis) => Some(analysis),
            Insight::Face(_) => None,
        }
    }
}

/// Turns raw attendance or image data into a structured insight
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: &InsightRequest) -> Result<Insight, ProviderError>;
}

/// Face analysis with canned fallback on any provider failure
pub async fn face_analysis_or_fallback(
    provider: &dyn InsightProvider,
    request: &InsightRequest,
) -> FaceAnalysis {
    match provider.analyze(request).await.map(Insight::into_face) {
        Ok(Some(face)) => face,
        Ok(None) => {
            tracing::warn!(provider = provider.name(), "Provider returned wrong insight kind");
            canned::face_analysis()
        }
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Face analysis failed, using fallback");
            canned::face_analysis()
        }
    }
}

/// Attendance analysis with canned fallback on any provider failure
pub async fn attendance_analysis_or_fallback(
    provider: &dyn InsightProvider,
    request: &InsightRequest,
) -> AttendanceAnalysis {
    match provider.analyze(request).await.map(Insight::into_attendance) {
        Ok(Some(analysis)) => analysis,
        Ok(None) => {
            tracing::warn!(provider = provider.name(), "Provider returned wrong insight kind");
            canned::attendance_analysis()
        }
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Attendance analysis failed, using fallback");
            canned::attendance_analysis()
        }
    }
}
