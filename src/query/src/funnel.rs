use std::sync::Arc;

use chrono::Duration;
use common::config::FunnelDefaults;
use common::defaults::DEFAULT_BREAKDOWN_TYPE;
use common::funnel::Breakdown;
use common::funnel::BreakdownAttributionType;
use common::funnel::BreakdownFilter;
use common::funnel::BreakdownKey;
use common::funnel::BreakdownType;
use common::funnel::FunnelConversionWindowTimeUnit;
use common::funnel::FunnelsActorsQuery;
use common::funnel::FunnelsFilter;
use common::funnel::FunnelsQuery;
use common::query::IntervalType;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::context::LimitContext;
use crate::context::QueryContext;
use crate::context::QueryModifiers;
use crate::context::Team;
use crate::error::QueryError;
use crate::error::Result;
use crate::timings::Timings;

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub timings: Option<Timings>,
    pub modifiers: Option<QueryModifiers>,
    pub limit_context: Option<LimitContext>,
    pub include_timestamp: Option<bool>,
    pub include_preceding_timestamp: Option<bool>,
    pub include_properties: Option<Vec<String>>,
    pub include_final_matching_events: Option<bool>,
    pub defaults: FunnelDefaults,
}

/// Fully defaulted view of a funnel query, read by the funnel query compiler.
///
/// The query is only reachable through `&self`, so its series cannot change
/// after construction. `max_steps` relies on that to memoize the step count.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunnelQueryContext {
    #[serde(skip)]
    base: QueryContext<FunnelsQuery>,
    funnels_filter: FunnelsFilter,
    breakdown_filter: BreakdownFilter,
    interval: IntervalType,
    breakdown: Option<Breakdown>,
    breakdown_type: BreakdownType,
    breakdown_attribution_type: BreakdownAttributionType,
    funnel_window_interval: u64,
    funnel_window_interval_unit: FunnelConversionWindowTimeUnit,
    actors_query: Option<FunnelsActorsQuery>,
    include_timestamp: Option<bool>,
    include_preceding_timestamp: Option<bool>,
    include_properties: Vec<String>,
    include_final_matching_events: Option<bool>,
    #[serde(skip)]
    max_steps: OnceCell<usize>,
}

impl FunnelQueryContext {
    pub fn new(query: FunnelsQuery, team: Arc<Team>, opts: Options) -> Self {
        let base = QueryContext::new(
            query,
            team,
            opts.timings,
            opts.modifiers,
            opts.limit_context,
        );

        let funnels_filter = base.query().funnels_filter.clone().unwrap_or_default();
        let breakdown_filter = base.query().breakdown_filter.clone().unwrap_or_default();

        let defaults = opts.defaults;
        let interval = base.query().interval.unwrap_or(defaults.interval);
        let breakdown_type = breakdown_filter
            .breakdown_type
            .unwrap_or(DEFAULT_BREAKDOWN_TYPE);
        let breakdown_attribution_type = funnels_filter
            .breakdown_attribution_type
            .unwrap_or(defaults.breakdown_attribution_type);
        let funnel_window_interval = match funnels_filter.funnel_window_interval {
            Some(0) => {
                debug!(
                    "zero funnel window, using default of {}",
                    defaults.window_interval
                );
                defaults.window_interval.get()
            }
            Some(n) => n,
            None => defaults.window_interval.get(),
        };
        let funnel_window_interval_unit = funnels_filter
            .funnel_window_interval_unit
            .unwrap_or(defaults.window_interval_unit);

        let breakdown = normalize_breakdown(&breakdown_filter);

        debug!(
            team_id = base.team().id,
            %interval,
            ?breakdown_type,
            window = funnel_window_interval,
            window_unit = funnel_window_interval_unit.as_str(),
            "funnel query context resolved"
        );

        Self {
            base,
            funnels_filter,
            breakdown_filter,
            interval,
            breakdown,
            breakdown_type,
            breakdown_attribution_type,
            funnel_window_interval,
            funnel_window_interval_unit,
            actors_query: None,
            include_timestamp: opts.include_timestamp,
            include_preceding_timestamp: opts.include_preceding_timestamp,
            include_properties: opts.include_properties.unwrap_or_default(),
            include_final_matching_events: opts.include_final_matching_events,
            max_steps: OnceCell::new(),
        }
    }

    pub fn base(&self) -> &QueryContext<FunnelsQuery> {
        &self.base
    }

    pub fn query(&self) -> &FunnelsQuery {
        self.base.query()
    }

    pub fn team(&self) -> &Team {
        self.base.team()
    }

    pub fn timings_mut(&mut self) -> &mut Timings {
        &mut self.base.timings
    }

    pub fn funnels_filter(&self) -> &FunnelsFilter {
        &self.funnels_filter
    }

    pub fn breakdown_filter(&self) -> &BreakdownFilter {
        &self.breakdown_filter
    }

    pub fn interval(&self) -> IntervalType {
        self.interval
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        self.breakdown.as_ref()
    }

    pub fn breakdown_type(&self) -> BreakdownType {
        self.breakdown_type
    }

    pub fn breakdown_attribution_type(&self) -> BreakdownAttributionType {
        self.breakdown_attribution_type
    }

    pub fn funnel_window_interval(&self) -> u64 {
        self.funnel_window_interval
    }

    pub fn funnel_window_interval_unit(&self) -> FunnelConversionWindowTimeUnit {
        self.funnel_window_interval_unit
    }

    /// Longest time a person may take from the first to the last step. Fails
    /// for windows too large to represent.
    pub fn funnel_window(&self) -> Result<Duration> {
        Ok(self
            .funnel_window_interval_unit
            .duration(self.funnel_window_interval)?)
    }

    pub fn include_timestamp(&self) -> Option<bool> {
        self.include_timestamp
    }

    pub fn include_preceding_timestamp(&self) -> Option<bool> {
        self.include_preceding_timestamp
    }

    pub fn include_properties(&self) -> &[String] {
        &self.include_properties
    }

    pub fn include_final_matching_events(&self) -> Option<bool> {
        self.include_final_matching_events
    }

    pub fn actors_query(&self) -> Option<&FunnelsActorsQuery> {
        self.actors_query.as_ref()
    }

    /// Attaches the actors query of the persons stage. The selected step must
    /// exist in this funnel.
    pub fn set_actors_query(&mut self, actors_query: FunnelsActorsQuery) -> Result<()> {
        if let Some(step) = actors_query.funnel_step {
            let max_steps = self.max_steps();
            if step == 0 || step.unsigned_abs() as usize > max_steps {
                return Err(QueryError::BadRequest(format!(
                    "funnel step {step} is out of range, funnel has {max_steps} steps"
                )));
            }
        }
        if let Some(steps) = &actors_query.funnel_custom_steps {
            let max_steps = self.max_steps();
            if let Some(step) = steps.iter().find(|s| **s == 0 || **s as usize > max_steps) {
                return Err(QueryError::BadRequest(format!(
                    "custom funnel step {step} is out of range, funnel has {max_steps} steps"
                )));
            }
        }

        self.actors_query = Some(actors_query);

        Ok(())
    }

    pub fn max_steps(&self) -> usize {
        *self
            .max_steps
            .get_or_init(|| self.base.query().series.len())
    }
}

// A bare string breakdown is boxed into a list for the types where the API
// accepts one, so readers can always iterate. Anything else is passed through.
fn normalize_breakdown(filter: &BreakdownFilter) -> Option<Breakdown> {
    let boxable = filter
        .breakdown_type
        .map_or(true, |t| t.allows_single_breakdown());

    match &filter.breakdown {
        Some(Breakdown::Single(key @ BreakdownKey::String(_))) if boxable => {
            Some(Breakdown::Multiple(vec![key.clone()]))
        }
        other => other.clone(),
    }
}
