use std::num::NonZeroU64;

use crate::query::funnel::BreakdownAttributionType;
use crate::query::funnel::BreakdownType;
use crate::query::funnel::FunnelConversionWindowTimeUnit;
use crate::query::IntervalType;

pub const DEFAULT_INTERVAL: IntervalType = IntervalType::Day;
pub const DEFAULT_BREAKDOWN_TYPE: BreakdownType = BreakdownType::Event;
pub const DEFAULT_BREAKDOWN_ATTRIBUTION_TYPE: BreakdownAttributionType =
    BreakdownAttributionType::FirstTouch;
pub const DEFAULT_FUNNEL_WINDOW_INTERVAL: NonZeroU64 = match NonZeroU64::new(14) {
    Some(v) => v,
    None => unreachable!(),
};
pub const DEFAULT_FUNNEL_WINDOW_INTERVAL_UNIT: FunnelConversionWindowTimeUnit =
    FunnelConversionWindowTimeUnit::Day;

// row caps per limit context
pub const DEFAULT_RETURNED_ROWS: usize = 100;
pub const MAX_SELECT_RETURNED_ROWS: usize = 50_000;
pub const MAX_SELECT_COHORT_CALCULATION_LIMIT: usize = 1_000_000_000;
