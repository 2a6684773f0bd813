//! SignalGrid Core — price series, indicators, signal cleaning, return
//! evaluation and strategies.
//!
//! This crate contains everything needed to evaluate one parameter
//! combination against one price series:
//! - Domain types (bars, price series, signals)
//! - Windowed indicators (SMA, EMA, TRIX, RSI, stochastic RSI)
//! - Signal generation and cleaning (crossovers, confirmation, run-collapse, trim)
//! - Return evaluation (position compounding, trade pairs, price difference)
//! - Strategy variants built fresh per parameter combination
//!
//! Nothing here holds mutable shared state; the runner crate fans
//! evaluations out across threads.

pub mod domain;
pub mod evaluation;
pub mod indicators;
pub mod params;
pub mod signals;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a sweep worker touches is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::SignalSeries>();
        require_sync::<domain::SignalSeries>();
        require_send::<params::ParameterCombination>();
        require_sync::<params::ParameterCombination>();

        // Evaluation
        require_send::<evaluation::EvaluationOutcome>();
        require_sync::<evaluation::EvaluationOutcome>();
        require_send::<evaluation::Costs>();
        require_sync::<evaluation::Costs>();

        // Strategies
        require_send::<Box<dyn strategy::Strategy>>();
        require_sync::<Box<dyn strategy::Strategy>>();
        require_send::<strategy::StrategySettings>();
        require_sync::<strategy::StrategySettings>();
        require_send::<strategy::SmaCrossover>();
        require_sync::<strategy::SmaCrossover>();
        require_send::<strategy::SmaTrix>();
        require_sync::<strategy::SmaTrix>();
        require_send::<strategy::StochRsiTrix>();
        require_sync::<strategy::StochRsiTrix>();
    }

    /// Architecture contract: a strategy sees the series only by shared
    /// reference and cannot change its own configuration.
    #[test]
    fn strategy_trait_takes_series_by_reference() {
        fn _check_trait_object_builds(
            strategy: &dyn strategy::Strategy,
            series: &domain::PriceSeries,
        ) -> Result<domain::SignalSeries, indicators::IndicatorError> {
            strategy.generate_signals(series)
        }
    }
}
