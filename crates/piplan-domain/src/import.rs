//! Import payloads handed over by the external work-tracking adapter.
//!
//! By the time these reach the domain, field mapping from the remote
//! system's schema has already happened; matching against existing rows is
//! done by external id.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImport {
    pub external_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub value_area: Option<String>,
    #[serde(default)]
    pub stories: Vec<StoryImport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryImport {
    pub external_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub story_points: Option<f64>,
    #[serde(default)]
    pub dev_story_points: Option<f64>,
    #[serde(default)]
    pub test_story_points: Option<f64>,
}
