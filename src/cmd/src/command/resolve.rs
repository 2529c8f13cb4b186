use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use common::config::Config;
use common::funnel::FunnelsQuery;
use query::funnel::Options;
use query::timings::QueryTiming;
use query::FunnelQueryContext;
use query::Team;
use query::Timings;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

#[derive(Parser, Clone, Debug)]
pub struct Resolve {
    /// Path to a TOML config, built-in defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Path to a funnels query in JSON
    #[arg(long)]
    pub query: PathBuf,
    #[arg(long, default_value_t = 1)]
    pub team_id: u64,
    #[arg(long, default_value_t = 1)]
    pub project_id: u64,
    #[arg(long)]
    pub include_timestamp: Option<bool>,
    #[arg(long)]
    pub include_preceding_timestamp: Option<bool>,
    #[arg(long, value_delimiter = ',')]
    pub include_properties: Option<Vec<String>>,
    #[arg(long)]
    pub include_final_matching_events: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolved<'a> {
    team_id: u64,
    max_steps: usize,
    context: &'a FunnelQueryContext,
    timings: Vec<QueryTiming>,
}

pub fn resolve(args: &Resolve, cfg: &Config) -> Result<FunnelQueryContext> {
    let data = fs::read_to_string(&args.query)?;

    let mut timings = Timings::new();
    let query = timings.measure("decode", |_| FunnelsQuery::from_json(&data))?;
    debug!("{} funnel steps", query.series.len());

    let opts = Options {
        timings: Some(timings),
        include_timestamp: args.include_timestamp,
        include_preceding_timestamp: args.include_preceding_timestamp,
        include_properties: args.include_properties.clone(),
        include_final_matching_events: args.include_final_matching_events,
        defaults: cfg.funnel.clone(),
        ..Default::default()
    };
    let team = Arc::new(Team::new(args.team_id, args.project_id));

    Ok(FunnelQueryContext::new(query, team, opts))
}

pub fn start(args: &Resolve, cfg: Config) -> Result<()> {
    let ctx = resolve(args, &cfg)?;
    let out = Resolved {
        team_id: ctx.team().id,
        max_steps: ctx.max_steps(),
        context: &ctx,
        timings: ctx.base().timings.to_list(),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}
