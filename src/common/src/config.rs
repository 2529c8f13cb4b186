use std::num::NonZeroU64;

use tracing::level_filters::LevelFilter;

use crate::defaults::DEFAULT_BREAKDOWN_ATTRIBUTION_TYPE;
use crate::defaults::DEFAULT_FUNNEL_WINDOW_INTERVAL;
use crate::defaults::DEFAULT_FUNNEL_WINDOW_INTERVAL_UNIT;
use crate::defaults::DEFAULT_INTERVAL;
use crate::query::funnel::BreakdownAttributionType;
use crate::query::funnel::FunnelConversionWindowTimeUnit;
use crate::query::IntervalType;

#[derive(Debug, Clone)]
pub struct Log {
    pub level: LevelFilter,
}

/// Values applied when a funnel query leaves the corresponding field unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelDefaults {
    pub interval: IntervalType,
    pub window_interval: NonZeroU64,
    pub window_interval_unit: FunnelConversionWindowTimeUnit,
    pub breakdown_attribution_type: BreakdownAttributionType,
}

impl Default for FunnelDefaults {
    fn default() -> Self {
        FunnelDefaults {
            interval: DEFAULT_INTERVAL,
            window_interval: DEFAULT_FUNNEL_WINDOW_INTERVAL,
            window_interval_unit: DEFAULT_FUNNEL_WINDOW_INTERVAL_UNIT,
            breakdown_attribution_type: DEFAULT_BREAKDOWN_ATTRIBUTION_TYPE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log: Log,
    pub funnel: FunnelDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log: Log {
                level: LevelFilter::INFO,
            },
            funnel: FunnelDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use crate::config::Config;
    use crate::query::funnel::BreakdownAttributionType;
    use crate::query::funnel::FunnelConversionWindowTimeUnit;
    use crate::query::IntervalType;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.log.level, LevelFilter::INFO);
        assert_eq!(cfg.funnel.interval, IntervalType::Day);
        assert_eq!(cfg.funnel.window_interval.get(), 14);
        assert_eq!(
            cfg.funnel.window_interval_unit,
            FunnelConversionWindowTimeUnit::Day
        );
        assert_eq!(
            cfg.funnel.breakdown_attribution_type,
            BreakdownAttributionType::FirstTouch
        );
    }
}
