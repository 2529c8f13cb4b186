use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::CommonError;

pub mod funnel;

/// Reporting granularity of an insight.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl IntervalType {
    pub fn as_str(&self) -> &str {
        match self {
            IntervalType::Minute => "minute",
            IntervalType::Hour => "hour",
            IntervalType::Day => "day",
            IntervalType::Week => "week",
            IntervalType::Month => "month",
        }
    }
}

impl Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IntervalType {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "minute" => IntervalType::Minute,
            "hour" => IntervalType::Hour,
            "day" => IntervalType::Day,
            "week" => IntervalType::Week,
            "month" => IntervalType::Month,
            _ => {
                return Err(CommonError::BadRequest(format!(
                    "unknown interval \"{s}\""
                )));
            }
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_date: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventsNode {
    // None matches any event
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Value>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionsNode {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Value>>,
}

/// A single funnel step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum SeriesNode {
    EventsNode(EventsNode),
    ActionsNode(ActionsNode),
}

impl SeriesNode {
    pub fn name(&self) -> String {
        match self {
            SeriesNode::EventsNode(node) => node
                .custom_name
                .clone()
                .or_else(|| node.event.clone())
                .unwrap_or_else(|| "All events".to_string()),
            SeriesNode::ActionsNode(node) => node
                .custom_name
                .clone()
                .or_else(|| node.name.clone())
                .unwrap_or_else(|| node.id.to_string()),
        }
    }
}
