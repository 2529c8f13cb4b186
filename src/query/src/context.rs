use std::sync::Arc;

use common::defaults::DEFAULT_RETURNED_ROWS;
use common::defaults::MAX_SELECT_COHORT_CALCULATION_LIMIT;
use common::defaults::MAX_SELECT_RETURNED_ROWS;
use serde::Deserialize;
use serde::Serialize;

use crate::timings::Timings;

/// Tenant the query runs for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: u64,
    pub project_id: u64,
    pub timezone: String,
}

impl Team {
    pub fn new(id: u64, project_id: u64) -> Self {
        Self {
            id,
            project_id,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LimitContext {
    #[default]
    Query,
    QueryAsync,
    Export,
    CohortCalculation,
}

impl LimitContext {
    pub fn max_rows(&self) -> usize {
        match self {
            LimitContext::Query | LimitContext::QueryAsync => DEFAULT_RETURNED_ROWS,
            LimitContext::Export => MAX_SELECT_RETURNED_ROWS,
            LimitContext::CohortCalculation => MAX_SELECT_COHORT_CALCULATION_LIMIT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersonsOnEventsMode {
    Disabled,
    PersonIdNoOverridePropertiesOnEvents,
    PersonIdOverridePropertiesOnEvents,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaterializationMode {
    Auto,
    LegacyNullAsString,
    LegacyNullAsNull,
    Disabled,
}

/// Compilation switches forwarded to the query engine as-is.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persons_on_events_mode: Option<PersonsOnEventsMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materialization_mode: Option<MaterializationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

/// State shared by every insight query: the query itself and the tenant scope
/// plus the engine's pass-through settings.
#[derive(Clone, Debug)]
pub struct QueryContext<Q> {
    query: Q,
    team: Arc<Team>,
    pub timings: Timings,
    pub modifiers: QueryModifiers,
    pub limit_context: LimitContext,
}

impl<Q> QueryContext<Q> {
    pub fn new(
        query: Q,
        team: Arc<Team>,
        timings: Option<Timings>,
        modifiers: Option<QueryModifiers>,
        limit_context: Option<LimitContext>,
    ) -> Self {
        Self {
            query,
            team,
            timings: timings.unwrap_or_default(),
            modifiers: modifiers.unwrap_or_default(),
            limit_context: limit_context.unwrap_or_default(),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn team(&self) -> &Team {
        &self.team
    }
}
