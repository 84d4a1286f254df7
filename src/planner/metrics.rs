use std::time::Duration;

/// Counters collected while planning one search.
#[derive(Clone, Debug, Default)]
pub struct PlannerMetrics {
    pub planning_time: Option<Duration>,
    pub jit_rounds: Option<u32>,
    pub clauses_examined: Option<u32>,
    pub choices_emitted: Option<u32>,
    pub strategy: Option<&'static str>,
}
