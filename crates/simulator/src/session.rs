//! Session-scoped dashboard state.
//!
//! A `Session` owns one engine, the simulated environment it is learning
//! about, and the charts' history. Nothing here is global: the caller keeps
//! the session and passes it around explicitly.

use crate::environment::RewardEnvironment;
use bandit_core::config::AppConfig;
use bandit_core::event_bus::{noop_sink, StepSink};
use bandit_core::types::{Algorithm, ArmEstimate, LogRecord, StepRecord};
use bandit_core::{BanditError, BanditResult};
use bandit_engine::{BanditAlgorithm, BanditConfig, BanditEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Keeps the environment's reward stream independent of the engine's
/// exploration stream when both come from one seed.
const ENVIRONMENT_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityMode {
    Random,
    Manual(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    pub n_arms: usize,
    pub algorithm: BanditAlgorithm,
    pub mode: ProbabilityMode,
    pub seed: Option<u64>,
}

impl SessionParams {
    pub fn from_config(algorithm: Algorithm, config: &AppConfig) -> Self {
        Self {
            n_arms: config.session.n_arms,
            algorithm: BanditAlgorithm::from_config(algorithm, config),
            mode: ProbabilityMode::Random,
            seed: config.session.seed,
        }
    }
}

pub struct Session {
    id: Uuid,
    params: SessionParams,
    engine: BanditEngine,
    environment: RewardEnvironment,
    rng: StdRng,
    sink: Arc<dyn StepSink>,
    history: Vec<StepRecord>,
    rmse_log: Vec<f64>,
    cumulative_regret: f64,
}

impl Session {
    /// Build a fresh session without pulling any arm.
    pub fn new(params: SessionParams) -> BanditResult<Self> {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(ENVIRONMENT_SEED_OFFSET)),
            None => StdRng::from_entropy(),
        };

        let environment = match &params.mode {
            ProbabilityMode::Random => RewardEnvironment::random(params.n_arms, &mut rng)?,
            ProbabilityMode::Manual(probs) => {
                if probs.len() != params.n_arms {
                    return Err(BanditError::config(format!(
                        "expected {} probabilities, got {}",
                        params.n_arms,
                        probs.len()
                    )));
                }
                RewardEnvironment::from_probabilities(probs.clone())?
            }
        };

        let engine = BanditEngine::new(BanditConfig {
            n_arms: params.n_arms,
            algorithm: params.algorithm.clone(),
            seed: params.seed,
        })?;

        let id = Uuid::new_v4();
        info!(
            session_id = %id,
            algorithm = %engine.algorithm(),
            n_arms = params.n_arms,
            true_probs = ?environment.true_probs(),
            "Session created"
        );

        Ok(Self {
            id,
            params,
            engine,
            environment,
            rng,
            sink: noop_sink(),
            history: Vec::new(),
            rmse_log: Vec::new(),
            cumulative_regret: 0.0,
        })
    }

    /// Build a session and run the algorithm's warm-up pass, if any.
    pub fn start(params: SessionParams, sink: Arc<dyn StepSink>) -> BanditResult<Self> {
        let mut session = Self::new(params)?.with_sink(sink);
        session.warm_up()?;
        Ok(session)
    }

    pub fn with_sink(mut self, sink: Arc<dyn StepSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Pull every arm once in index order. No-op for algorithms without
    /// a warm-up or once it has already happened.
    pub fn warm_up(&mut self) -> BanditResult<&[StepRecord]> {
        let start = self.history.len();
        if self.engine.algorithm().warms_up() {
            while self.engine.state().first_unpulled().is_some() {
                self.pull_once()?;
            }
            info!(session_id = %self.id, pulls = self.history.len() - start, "Warm-up pass done");
        }
        Ok(&self.history[start..])
    }

    /// One choose / draw / update cycle.
    pub fn pull_once(&mut self) -> BanditResult<StepRecord> {
        let arm = self.engine.choose_arm();
        let reward = self.environment.draw(arm, &mut self.rng)?;
        let record = self.engine.update(arm, reward)?;

        self.rmse_log.push(self.environment.rmse(&record.estimates));
        self.cumulative_regret += self.environment.regret(arm);
        self.history.push(record.clone());
        self.sink.emit(&LogRecord::new(
            self.engine.algorithm(),
            &record,
            self.engine.counts(),
        ))?;
        Ok(record)
    }

    pub fn pull_batch(&mut self, count: usize) -> BanditResult<&[StepRecord]> {
        let start = self.history.len();
        for _ in 0..count {
            self.pull_once()?;
        }
        debug!(session_id = %self.id, count, step = self.step(), "Batch pulled");
        Ok(&self.history[start..])
    }

    /// Repeated batches with a pause between them; `on_round` sees each
    /// round's records as soon as the batch finishes.
    pub fn auto_run<F>(
        &mut self,
        rounds: usize,
        batch: usize,
        delay: Duration,
        mut on_round: F,
    ) -> BanditResult<()>
    where
        F: FnMut(usize, &[StepRecord]),
    {
        for round in 0..rounds {
            let records = self.pull_batch(batch)?;
            on_round(round, records);
            if round + 1 < rounds && !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        info!(session_id = %self.id, rounds, batch, step = self.step(), "Auto-run complete");
        Ok(())
    }

    /// Whether this session can keep running under `params`; any change
    /// to arms, algorithm parameters or probabilities needs a new session.
    pub fn matches(&self, params: &SessionParams) -> bool {
        self.params == *params
    }

    /// Start over with the same parameters.
    pub fn reset(&mut self) -> BanditResult<()> {
        let sink = self.sink.clone();
        *self = Self::new(self.params.clone())?.with_sink(sink);
        self.warm_up()?;
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn algorithm(&self) -> Algorithm {
        self.engine.algorithm()
    }

    pub fn engine(&self) -> &BanditEngine {
        &self.engine
    }

    pub fn environment(&self) -> &RewardEnvironment {
        &self.environment
    }

    pub fn step(&self) -> u64 {
        self.engine.steps()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn rmse_log(&self) -> &[f64] {
        &self.rmse_log
    }

    pub fn cumulative_regret(&self) -> f64 {
        self.cumulative_regret
    }

    pub fn estimates(&self) -> Vec<ArmEstimate> {
        self.engine.estimates()
    }

    /// Trailing rolling mean of the RMSE log; the first points average
    /// over whatever history exists.
    pub fn smoothed_rmse(&self, window: usize) -> Vec<f64> {
        let window = window.max(1);
        let mut out = Vec::with_capacity(self.rmse_log.len());
        let mut sum = 0.0;
        for (i, value) in self.rmse_log.iter().enumerate() {
            sum += value;
            if i >= window {
                sum -= self.rmse_log[i - window];
            }
            out.push(sum / (i + 1).min(window) as f64);
        }
        out
    }

    /// Pull counts keyed by arm. Thompson sessions with a prior above
    /// one also show the posterior parameters.
    pub fn pull_counts_view(&self) -> Value {
        let show_posterior = matches!(
            self.params.algorithm,
            BanditAlgorithm::ThompsonSampling { initial_alpha, initial_beta, .. }
                if initial_alpha > 1.0 || initial_beta > 1.0
        );

        let mut map = Map::new();
        for estimate in self.engine.estimates() {
            let value = match (show_posterior, estimate.posterior) {
                (true, Some(p)) => json!({
                    "alpha": p.alpha,
                    "beta": p.beta,
                    "counts": estimate.pulls,
                }),
                _ => json!(estimate.pulls),
            };
            map.insert(estimate.arm.to_string(), value);
        }
        Value::Object(map)
    }
}
