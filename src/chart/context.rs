//! Chart context: one bar store, its resample cache and the active engine.

use std::sync::Arc;
use tracing::{debug, info};

use super::engine::{ChartOutput, IndicatorEngine};
use crate::config::EngineConfig;
use crate::data::{Bar, BarStore, RawBar, Resampler};
use crate::error::ConfigError;

pub struct ChartContext {
    store: BarStore,
    resampler: Resampler,
    engine: IndicatorEngine,
}

impl ChartContext {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store: BarStore::new(),
            resampler: Resampler::new(),
            engine: IndicatorEngine::new(config)?,
        })
    }

    /// Normalize and merge raw records, returning the store size
    pub fn ingest(&mut self, raw: Vec<RawBar>) -> usize {
        self.store.ingest(raw).len()
    }

    /// Merge already normalized bars, returning the store size
    pub fn merge(&mut self, bars: Vec<Bar>) -> usize {
        self.store.merge(bars).len()
    }

    pub fn store(&self) -> &BarStore {
        &self.store
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// The store resampled at the configured timeframe
    pub fn resampled(&mut self) -> Arc<[Bar]> {
        self.resampler
            .resample(self.store.bars(), self.engine.timeframe())
    }

    /// Resample and run every enabled option
    pub fn refresh(&mut self) -> ChartOutput {
        let bars = self.resampled();
        let output = self.engine.compute(&bars);
        let warmup = self.engine.warmup();
        debug!(
            timeframe = %self.engine.timeframe(),
            source = self.store.len(),
            bars = bars.len(),
            warmup,
            "refreshed chart"
        );
        if !bars.is_empty() && bars.len() <= warmup {
            debug!(bars = bars.len(), warmup, "series still inside the warm-up window");
        }
        output
    }

    /// Swap in a new configuration.
    ///
    /// The new engine is fully built before the swap, so a rejected
    /// configuration leaves the current one in place.
    pub fn reconfigure(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        let engine = IndicatorEngine::new(config)?;
        info!(timeframe = %engine.timeframe(), "chart reconfigured");
        self.engine = engine;
        Ok(())
    }
}
