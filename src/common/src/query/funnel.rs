use std::fmt;
use std::fmt::Display;
use std::slice;
use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::CommonError;
use crate::error::Result;
use crate::query::DateRange;
use crate::query::IntervalType;
use crate::query::SeriesNode;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelsQuery {
    pub series: Vec<SeriesNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnels_filter: Option<FunnelsFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_filter: Option<BreakdownFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_test_accounts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_group_type_index: Option<u32>,
}

impl FunnelsQuery {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelsFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_window_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_window_interval_unit: Option<FunnelConversionWindowTimeUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_attribution_type: Option<BreakdownAttributionType>,
    // step index, only meaningful with BreakdownAttributionType::Step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_attribution_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_order_type: Option<StepOrderValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_viz_type: Option<FunnelVizType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_step_reference: Option<FunnelStepReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_from_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_to_step: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<FunnelExclusion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FunnelLayout>,
}

// field names are snake_case on the wire, unlike the funnels filter
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BreakdownFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_type: Option<BreakdownType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_normalize_url: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_group_type_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_hide_other_aggregation: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelExclusion {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub funnel_from_step: u32,
    pub funnel_to_step: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Value>>,
}

/// Scalar breakdown value: a property name, expression or cohort id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum BreakdownKey {
    Int(i64),
    String(String),
}

impl Display for BreakdownKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BreakdownKey::Int(v) => write!(f, "{v}"),
            BreakdownKey::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for BreakdownKey {
    fn from(v: &str) -> Self {
        BreakdownKey::String(v.to_string())
    }
}

impl From<i64> for BreakdownKey {
    fn from(v: i64) -> Self {
        BreakdownKey::Int(v)
    }
}

/// Breakdown as accepted by the API: a bare value or a list of values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Breakdown {
    Single(BreakdownKey),
    Multiple(Vec<BreakdownKey>),
}

impl Breakdown {
    pub fn keys(&self) -> &[BreakdownKey] {
        match self {
            Breakdown::Single(key) => slice::from_ref(key),
            Breakdown::Multiple(keys) => keys.as_slice(),
        }
    }

    pub fn as_single_str(&self) -> Option<&str> {
        match self {
            Breakdown::Single(BreakdownKey::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownType {
    Cohort,
    Person,
    Event,
    Group,
    Session,
    #[serde(rename = "hogql")]
    HogQL,
    DataWarehouse,
    DataWarehousePersonProperty,
}

impl BreakdownType {
    /// Whether the API accepts a bare string breakdown for this type.
    pub fn allows_single_breakdown(&self) -> bool {
        match self {
            BreakdownType::Event | BreakdownType::Person | BreakdownType::HogQL => true,
            BreakdownType::Cohort
            | BreakdownType::Group
            | BreakdownType::Session
            | BreakdownType::DataWarehouse
            | BreakdownType::DataWarehousePersonProperty => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownAttributionType {
    FirstTouch,
    LastTouch,
    AllEvents,
    Step,
}

impl FromStr for BreakdownAttributionType {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "first_touch" => BreakdownAttributionType::FirstTouch,
            "last_touch" => BreakdownAttributionType::LastTouch,
            "all_events" => BreakdownAttributionType::AllEvents,
            "step" => BreakdownAttributionType::Step,
            _ => {
                return Err(CommonError::BadRequest(format!(
                    "unknown breakdown attribution type \"{s}\""
                )));
            }
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FunnelConversionWindowTimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl FunnelConversionWindowTimeUnit {
    /// Length of `n` units. A month counts as 31 days.
    pub fn duration(&self, n: u64) -> Result<Duration> {
        let out_of_range = || {
            CommonError::BadRequest(format!(
                "window of {n} {} is out of range",
                self.as_str()
            ))
        };
        let v = i64::try_from(n).map_err(|_| out_of_range())?;
        let duration = match self {
            FunnelConversionWindowTimeUnit::Second => Duration::try_seconds(v),
            FunnelConversionWindowTimeUnit::Minute => Duration::try_minutes(v),
            FunnelConversionWindowTimeUnit::Hour => Duration::try_hours(v),
            FunnelConversionWindowTimeUnit::Day => Duration::try_days(v),
            FunnelConversionWindowTimeUnit::Week => Duration::try_weeks(v),
            FunnelConversionWindowTimeUnit::Month => {
                v.checked_mul(31).and_then(Duration::try_days)
            }
        };

        duration.ok_or_else(out_of_range)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FunnelConversionWindowTimeUnit::Second => "second",
            FunnelConversionWindowTimeUnit::Minute => "minute",
            FunnelConversionWindowTimeUnit::Hour => "hour",
            FunnelConversionWindowTimeUnit::Day => "day",
            FunnelConversionWindowTimeUnit::Week => "week",
            FunnelConversionWindowTimeUnit::Month => "month",
        }
    }
}

impl FromStr for FunnelConversionWindowTimeUnit {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "second" => FunnelConversionWindowTimeUnit::Second,
            "minute" => FunnelConversionWindowTimeUnit::Minute,
            "hour" => FunnelConversionWindowTimeUnit::Hour,
            "day" => FunnelConversionWindowTimeUnit::Day,
            "week" => FunnelConversionWindowTimeUnit::Week,
            "month" => FunnelConversionWindowTimeUnit::Month,
            _ => {
                return Err(CommonError::BadRequest(format!(
                    "unknown funnel window unit \"{s}\""
                )));
            }
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepOrderValue {
    Strict,
    Unordered,
    Ordered,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunnelVizType {
    Steps,
    TimeToConvert,
    Trends,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStepReference {
    Total,
    Previous,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunnelLayout {
    Horizontal,
    Vertical,
}

/// Selects the persons behind one segment of a funnel result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelsActorsQuery {
    pub source: FunnelsQuery,
    // 1-based; negative values select persons who dropped off before that step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_step: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_custom_steps: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_step_breakdown: Option<Breakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_trends_drop_off: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_trends_entrance_period_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_recordings: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::error::CommonError;
    use crate::error::Result;
    use crate::query::funnel::Breakdown;
    use crate::query::funnel::BreakdownKey;
    use crate::query::funnel::BreakdownType;
    use crate::query::funnel::FunnelConversionWindowTimeUnit;
    use crate::query::funnel::FunnelsQuery;
    use crate::query::IntervalType;
    use crate::query::SeriesNode;

    #[test]
    fn test_breakdown_shapes() -> std::result::Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::from_str::<Breakdown>(r#""$browser""#)?,
            Breakdown::Single(BreakdownKey::String("$browser".to_string()))
        );
        assert_eq!(
            serde_json::from_str::<Breakdown>(r#"7"#)?,
            Breakdown::Single(BreakdownKey::Int(7))
        );
        assert_eq!(
            serde_json::from_str::<Breakdown>(r#"[1, "all"]"#)?,
            Breakdown::Multiple(vec![
                BreakdownKey::Int(1),
                BreakdownKey::String("all".to_string())
            ])
        );
        assert!(serde_json::from_str::<Breakdown>(r#"1.5"#).is_err());

        Ok(())
    }

    #[test]
    fn test_breakdown_keys() {
        let single = Breakdown::Single("country".into());
        assert_eq!(single.keys(), &[BreakdownKey::String("country".to_string())]);
        assert_eq!(single.as_single_str(), Some("country"));

        let many = Breakdown::Multiple(vec![1i64.into(), 2i64.into()]);
        assert_eq!(many.keys().len(), 2);
        assert_eq!(many.as_single_str(), None);
        assert_eq!(Breakdown::Single(3i64.into()).as_single_str(), None);
    }

    #[test]
    fn test_single_breakdown_types() {
        let allowed = [
            BreakdownType::Event,
            BreakdownType::Person,
            BreakdownType::HogQL,
        ];
        for t in allowed {
            assert!(t.allows_single_breakdown(), "{t:?}");
        }
        let denied = [
            BreakdownType::Cohort,
            BreakdownType::Group,
            BreakdownType::Session,
            BreakdownType::DataWarehouse,
            BreakdownType::DataWarehousePersonProperty,
        ];
        for t in denied {
            assert!(!t.allows_single_breakdown(), "{t:?}");
        }
    }

    #[test]
    fn test_enum_wire_names() -> std::result::Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::from_str::<BreakdownType>(r#""hogql""#)?,
            BreakdownType::HogQL
        );
        assert_eq!(
            serde_json::from_str::<BreakdownType>(r#""data_warehouse_person_property""#)?,
            BreakdownType::DataWarehousePersonProperty
        );
        assert_eq!(
            serde_json::to_string(&FunnelConversionWindowTimeUnit::Week)?,
            r#""week""#
        );

        Ok(())
    }

    #[test]
    fn test_decode_query() -> Result<()> {
        let query = FunnelsQuery::from_json(
            r#"{
                "kind": "FunnelsQuery",
                "series": [
                    {"kind": "EventsNode", "event": "$pageview"},
                    {"kind": "ActionsNode", "id": 12, "name": "Signed up"}
                ],
                "interval": "week",
                "funnelsFilter": {"funnelWindowInterval": 3, "funnelWindowIntervalUnit": "hour"},
                "breakdownFilter": {"breakdown": "$browser", "breakdown_type": "event"}
            }"#,
        )?;

        assert_eq!(query.series.len(), 2);
        assert_eq!(query.series[0].name(), "$pageview");
        assert_eq!(query.series[1].name(), "Signed up");
        assert!(matches!(query.series[1], SeriesNode::ActionsNode(_)));
        assert_eq!(query.interval, Some(IntervalType::Week));

        let funnels_filter = query.funnels_filter.unwrap();
        assert_eq!(funnels_filter.funnel_window_interval, Some(3));
        assert_eq!(
            funnels_filter.funnel_window_interval_unit,
            Some(FunnelConversionWindowTimeUnit::Hour)
        );
        assert_eq!(funnels_filter.breakdown_attribution_type, None);

        let breakdown_filter = query.breakdown_filter.unwrap();
        assert_eq!(breakdown_filter.breakdown_type, Some(BreakdownType::Event));
        assert_eq!(
            breakdown_filter.breakdown,
            Some(Breakdown::Single("$browser".into()))
        );

        Ok(())
    }

    #[test]
    fn test_decode_query_without_series() {
        assert!(FunnelsQuery::from_json(r#"{"interval": "day"}"#).is_err());
    }

    #[test]
    fn test_window_duration() -> Result<()> {
        assert_eq!(
            FunnelConversionWindowTimeUnit::Day.duration(14)?,
            chrono::Duration::days(14)
        );
        assert_eq!(
            FunnelConversionWindowTimeUnit::Month.duration(2)?,
            chrono::Duration::days(62)
        );
        assert_eq!(
            "minute".parse::<FunnelConversionWindowTimeUnit>().unwrap(),
            FunnelConversionWindowTimeUnit::Minute
        );
        assert!("fortnight".parse::<FunnelConversionWindowTimeUnit>().is_err());

        Ok(())
    }

    #[test]
    fn test_window_duration_out_of_range() {
        for unit in [
            FunnelConversionWindowTimeUnit::Day,
            FunnelConversionWindowTimeUnit::Week,
            FunnelConversionWindowTimeUnit::Month,
        ] {
            assert!(
                matches!(
                    unit.duration(1_000_000_000_000_000),
                    Err(CommonError::BadRequest(_))
                ),
                "{unit:?}"
            );
            assert!(unit.duration(u64::MAX).is_err(), "{unit:?}");
        }
        assert!(FunnelConversionWindowTimeUnit::Second
            .duration(u64::MAX)
            .is_err());
        // overflows i64 once multiplied by 31
        assert!(FunnelConversionWindowTimeUnit::Month
            .duration(i64::MAX as u64 / 31 + 1)
            .is_err());
    }
}
