//! Result records and the bundles written to the combined log.
//!
//! Field names on the wire follow the grader's `TestCaseResult` DTO,
//! including its `erroMessage` spelling.

use crate::title::{Category, TestTitle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use yaksha_config::{Config, KeyMode, MethodTypeMode};

/// Outcome of a single test as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    /// Map a host state string; only `"passed"` counts as a pass
    pub fn from_state(state: &str) -> Self {
        if state == "passed" {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn earned_score(&self) -> u32 {
        if self.is_passed() {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    #[serde(rename = "methodName")]
    pub identifier: String,
    #[serde(rename = "methodType")]
    pub category: String,
    pub actual_score: u32,
    pub earned_score: u32,
    pub status: TestStatus,
    pub is_mandatory: bool,
    #[serde(rename = "erroMessage")]
    pub error_message: String,
}

/// One line of the combined log: a single-entry result mapping plus the
/// side-channel data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    pub test_case_results: BTreeMap<String, TestCaseResult>,
    pub custom_data: String,
}

impl ResultBundle {
    /// Compact JSON, one line
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Controls how records and bundles are shaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    pub key_mode: KeyMode,
    pub result_key: String,
    pub method_type: MethodTypeMode,
}

impl Default for RecordShape {
    fn default() -> Self {
        Self {
            key_mode: KeyMode::Constant,
            result_key: yaksha_config::project::DEFAULT_RESULT_KEY.to_string(),
            method_type: MethodTypeMode::Fixed,
        }
    }
}

impl RecordShape {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key_mode: config.key_mode(),
            result_key: config.result_key(),
            method_type: config.method_type(),
        }
    }

    pub fn build_result(
        &self,
        title: &TestTitle,
        status: TestStatus,
        error: Option<&str>,
    ) -> TestCaseResult {
        let category = match self.method_type {
            MethodTypeMode::Fixed => Category::Boundary,
            MethodTypeMode::Derived => title.category(),
        };
        TestCaseResult {
            identifier: title.identifier(),
            category: category.as_str().to_string(),
            actual_score: 1,
            earned_score: status.earned_score(),
            status,
            is_mandatory: true,
            error_message: error.unwrap_or_default().to_string(),
        }
    }

    pub fn build_bundle(&self, result: TestCaseResult, custom_data: &str) -> ResultBundle {
        let key = match self.key_mode {
            KeyMode::Constant => self.result_key.clone(),
            KeyMode::Identifier => result.identifier.clone(),
        };
        let mut test_case_results = BTreeMap::new();
        test_case_results.insert(key, result);
        ResultBundle {
            test_case_results,
            custom_data: custom_data.to_string(),
        }
    }
}
