//! Configuration options for the CFR solver.
//!
//! The four supported variants (vanilla CFR, CFR+, Linear CFR and Discounted
//! CFR) are one algorithm with different discount parameters, so a variant is
//! nothing more than a preset for [`DiscountParams`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cfr::error::CfrError;
use crate::cfr::storage::StrategyProfile;

/// Which CFR variant the solver should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CfrVariant {
    /// Zinkevich et al. (2007): no discounting, uniform averaging.
    Vanilla,
    /// Tammelin (2014): negative regret discarded, quadratic averaging.
    CfrPlus,
    /// Linear CFR: every accumulator discounted by `t / (t + 1)`.
    Linear,
    /// Brown & Sandholm (2019) with α = 3/2, β = 0, γ = 2.
    #[default]
    Discounted,
    /// Explicit parameters supplied through [`CFRConfig::with_discount`].
    Custom,
}

impl CfrVariant {
    /// Discount parameters this variant stands for.
    ///
    /// `Custom` has no preset and falls back to vanilla parameters.
    pub fn params(self) -> DiscountParams {
        match self {
            CfrVariant::Vanilla | CfrVariant::Custom => DiscountParams {
                alpha: f64::INFINITY,
                beta: f64::INFINITY,
                gamma: 0.0,
                floor_regret: false,
            },
            CfrVariant::CfrPlus => DiscountParams {
                alpha: f64::INFINITY,
                beta: f64::NEG_INFINITY,
                gamma: 2.0,
                floor_regret: true,
            },
            CfrVariant::Linear => DiscountParams {
                alpha: 1.0,
                beta: 1.0,
                gamma: 1.0,
                floor_regret: false,
            },
            CfrVariant::Discounted => DiscountParams {
                alpha: 1.5,
                beta: 0.0,
                gamma: 2.0,
                floor_regret: true,
            },
        }
    }
}

impl fmt::Display for CfrVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CfrVariant::Vanilla => "CFR",
            CfrVariant::CfrPlus => "CFR+",
            CfrVariant::Linear => "LCFR",
            CfrVariant::Discounted => "DCFR",
            CfrVariant::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

/// Exponents controlling how accumulated regrets and strategy sums decay.
///
/// After iteration `t` the totals carried over from iterations `1..t` are
/// scaled with `s = t - 1` before the new contributions are added:
///
/// ```text
/// positive regret  *= s^α / (s^α + 1)     α = +inf keeps it untouched
/// negative regret  *= s^β / (s^β + 1)     β = -inf discards it
/// strategy sum     *= (s / (s + 1))^γ     γ = 0 is uniform averaging
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountParams {
    /// Positive regret exponent.
    pub alpha: f64,
    /// Negative regret exponent.
    pub beta: f64,
    /// Strategy sum exponent.
    pub gamma: f64,
    /// Floor cumulative regret at zero after every update (RM+).
    pub floor_regret: bool,
}

impl DiscountParams {
    /// Multipliers to apply to the totals before committing iteration `iteration`.
    pub fn factors(&self, iteration: u64) -> DiscountFactors {
        let s = iteration.saturating_sub(1) as f64;
        DiscountFactors {
            positive: regret_factor(s, self.alpha),
            negative: regret_factor(s, self.beta),
            strategy: (s / (s + 1.0)).powf(self.gamma),
            floor_regret: self.floor_regret,
        }
    }

    fn validate(&self) -> Result<(), CfrError> {
        if self.alpha.is_nan() || self.beta.is_nan() {
            return Err(CfrError::InvalidConfiguration(format!(
                "regret exponents must be numbers (alpha = {}, beta = {})",
                self.alpha, self.beta
            )));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(CfrError::InvalidConfiguration(format!(
                "strategy exponent gamma = {} must be finite and non-negative",
                self.gamma
            )));
        }
        Ok(())
    }
}

fn regret_factor(s: f64, exponent: f64) -> f64 {
    if exponent == f64::INFINITY {
        return 1.0;
    }
    if exponent == f64::NEG_INFINITY {
        return 0.0;
    }
    let p = s.powf(exponent);
    if p.is_infinite() {
        1.0
    } else {
        p / (p + 1.0)
    }
}

/// Concrete multipliers for one iteration, derived from [`DiscountParams`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountFactors {
    /// Multiplier for positive cumulative regret.
    pub positive: f64,
    /// Multiplier for negative cumulative regret.
    pub negative: f64,
    /// Multiplier for the cumulative strategy sum.
    pub strategy: f64,
    /// Whether regret is floored at zero after the update.
    pub floor_regret: bool,
}

impl DiscountFactors {
    /// Factors that leave every accumulator untouched.
    pub fn none() -> Self {
        Self {
            positive: 1.0,
            negative: 1.0,
            strategy: 1.0,
            floor_regret: false,
        }
    }
}

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use cfr_solver::cfr::{CFRConfig, CfrVariant};
///
/// let config = CFRConfig::cfr_plus().with_seed(7);
/// assert_eq!(config.variant, CfrVariant::CfrPlus);
/// assert!(config.discount.floor_regret);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CFRConfig {
    /// Variant the discount parameters came from (for reporting).
    pub variant: CfrVariant,

    /// Discount parameters actually used by the solver.
    pub discount: DiscountParams,

    /// Sample one chance outcome per iteration instead of enumerating all.
    ///
    /// Enumeration is exact and deterministic; sampling trades accuracy per
    /// iteration for cheaper iterations.
    pub chance_sampling: bool,

    /// Random seed for chance sampling.
    ///
    /// If `None`, a random seed is drawn. Ignored when chance is enumerated.
    pub seed: Option<u64>,

    /// Draw a progress bar on stderr during training.
    pub show_progress: bool,

    /// Emit a debug log line every `log_interval` iterations (0 disables).
    pub log_interval: u64,
}

impl Default for CFRConfig {
    fn default() -> Self {
        Self::from_variant(CfrVariant::default())
    }
}

impl CFRConfig {
    /// Create a new CFRConfig with default settings (DCFR).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for a preset variant.
    pub fn from_variant(variant: CfrVariant) -> Self {
        Self {
            variant,
            discount: variant.params(),
            chance_sampling: false,
            seed: None,
            show_progress: false,
            log_interval: 1000,
        }
    }

    /// Vanilla CFR.
    pub fn vanilla() -> Self {
        Self::from_variant(CfrVariant::Vanilla)
    }

    /// CFR+ (regret matching plus, quadratic averaging).
    pub fn cfr_plus() -> Self {
        Self::from_variant(CfrVariant::CfrPlus)
    }

    /// Linear CFR.
    pub fn linear() -> Self {
        Self::from_variant(CfrVariant::Linear)
    }

    /// Discounted CFR with the recommended (3/2, 0, 2) parameters.
    pub fn discounted() -> Self {
        Self::from_variant(CfrVariant::Discounted)
    }

    /// Builder method: use explicit discount parameters.
    pub fn with_discount(mut self, alpha: f64, beta: f64, gamma: f64, floor_regret: bool) -> Self {
        self.variant = CfrVariant::Custom;
        self.discount = DiscountParams {
            alpha,
            beta,
            gamma,
            floor_regret,
        };
        self
    }

    /// Builder method: sample chance outcomes instead of enumerating them.
    pub fn with_chance_sampling(mut self, enable: bool) -> Self {
        self.chance_sampling = enable;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: show a progress bar while training.
    pub fn with_progress(mut self, enable: bool) -> Self {
        self.show_progress = enable;
        self
    }

    /// Builder method: set how often progress is logged.
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CfrError> {
        self.discount.validate()
    }
}

/// Values monitored after one training iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    /// Iteration number (1-based).
    pub iteration: u64,
    /// Exploitability of the average strategy profile.
    pub exploitability: f64,
    /// Sum over information sets of the L1 change in average strategy.
    pub strategy_change: f64,
    /// The same change split by the player acting at each information set.
    pub strategy_change_by_player: Vec<f64>,
    /// Sum of positive cumulative regret over all information sets.
    pub total_regret: f64,
}

/// Everything a training run hands to its consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Iteration at which training stopped.
    pub iterations: u64,
    /// Whether early stopping ended the run before the iteration budget.
    pub stopped_early: bool,
    /// Exploitability after each iteration.
    pub exploitability: Vec<f64>,
    /// Total strategy change after each iteration.
    pub strategy_change: Vec<f64>,
    /// Per-player strategy change after each iteration.
    pub strategy_change_by_player: Vec<Vec<f64>>,
    /// Total positive regret after each iteration.
    pub total_regret: Vec<f64>,
    /// Final average strategy per information set.
    pub average_strategy: StrategyProfile,
    /// Wall-clock training time in seconds.
    pub elapsed_seconds: f64,
}

impl TrainingReport {
    /// Exploitability after the last iteration.
    pub fn final_exploitability(&self) -> Option<f64> {
        self.exploitability.last().copied()
    }

    /// First iteration whose exploitability is at or below `threshold`.
    pub fn iterations_to_reach(&self, threshold: f64) -> Option<u64> {
        self.exploitability
            .iter()
            .position(|&e| e <= threshold)
            .map(|i| i as u64 + 1)
    }

    /// Serialize the report for external persistence or plotting.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
