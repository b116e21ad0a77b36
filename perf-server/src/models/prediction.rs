//! Prediction request/response model

use perf_core::{ClassProbabilities, PerformanceLevel, PredictionResult, StudentRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Business,
    Engineering,
    Medical,
    Science,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Business => "Business",
            Department::Engineering => "Engineering",
            Department::Medical => "Medical",
            Department::Science => "Science",
        }
    }
}

/// Body of `POST /predict`; every field is required
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    #[serde(rename = "Age")]
    #[validate(range(min = 0.0, max = 120.0))]
    pub age: f64,

    #[serde(rename = "Gender")]
    pub gender: Gender,

    #[serde(rename = "Department")]
    pub department: Department,

    #[serde(rename = "Sleep_Duration")]
    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_duration: f64,

    #[serde(rename = "Study_Hours")]
    #[validate(range(min = 0.0, max = 24.0))]
    pub study_hours: f64,

    #[serde(rename = "Social_Media_Hours")]
    #[validate(range(min = 0.0, max = 24.0))]
    pub social_media_hours: f64,

    /// Minutes per week
    #[serde(rename = "Physical_Activity")]
    #[validate(range(min = 0.0, max = 300.0))]
    pub physical_activity: f64,

    #[serde(rename = "Stress_Level")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub stress_level: f64,
}

impl From<PredictRequest> for StudentRecord {
    fn from(req: PredictRequest) -> Self {
        StudentRecord {
            age: req.age,
            gender: req.gender.as_str().to_string(),
            department: req.department.as_str().to_string(),
            sleep_duration: req.sleep_duration,
            study_hours: req.study_hours,
            social_media_hours: req.social_media_hours,
            physical_activity: req.physical_activity,
            stress_level: req.stress_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_profile: PerformanceLevel,
    /// `null` when the model can't estimate probabilities
    pub probabilities: Option<ClassProbabilities>,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            predicted_profile: result.label,
            probabilities: result.probabilities,
        }
    }
}
