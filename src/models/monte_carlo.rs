use crate::errors::{invalid, PricerResult};
use crate::inputs::PricingInputs;
use crate::models::{OptionKind, OptionPricer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Monte Carlo pricing for European options.
///
/// S_T = S * exp((r - sigma^2/2) * T + sigma * sqrt(T) * Z),  Z ~ N(0, 1)
/// price = e^{-rT} * mean(payoff(S_T))
///
/// Without a seed every call draws a fresh entropy seed, so two calls are
/// independent estimates. With a seed every call replays the same draws.
#[derive(Debug, Clone)]
pub struct SimulationPricer {
    inputs: PricingInputs,
    simulations: usize,
    seed: Option<u64>,
}

/// Sample estimate of an option price.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SimulationEstimate {
    pub price: f64,
    /// Standard error of the mean discounted payoff.
    pub std_error: f64,
    pub simulations: usize,
}

impl SimulationPricer {
    pub fn new(inputs: PricingInputs, simulations: usize) -> PricerResult<Self> {
        inputs.validate()?;
        if simulations == 0 {
            return Err(invalid("simulations must be > 0, got 0"));
        }
        Ok(Self {
            inputs,
            simulations,
            seed: None,
        })
    }

    /// Replay the same draws on every call.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn simulations(&self) -> usize {
        self.simulations
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn estimate(&self, kind: OptionKind) -> SimulationEstimate {
        let p = &self.inputs;
        let drift = (p.risk_free_rate - 0.5 * p.volatility * p.volatility) * p.time_to_expiry;
        let diffusion = p.volatility * p.time_to_expiry.sqrt();
        let discount = p.discount_factor();

        let mut rng = self.rng();
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..self.simulations {
            let z: f64 = StandardNormal.sample(&mut rng);
            let terminal = p.underlying_price * (drift + diffusion * z).exp();
            let discounted = discount * kind.payoff(terminal, p.strike_price);
            sum += discounted;
            sum_sq += discounted * discounted;
        }

        let n = self.simulations as f64;
        let mean = sum / n;
        let std_error = if self.simulations > 1 {
            let variance = ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
            (variance / n).sqrt()
        } else {
            0.0
        };

        tracing::debug!(
            ?kind,
            simulations = self.simulations,
            price = mean,
            std_error,
            "monte carlo estimate"
        );

        SimulationEstimate {
            price: mean,
            std_error,
            simulations: self.simulations,
        }
    }
}

impl OptionPricer for SimulationPricer {
    #[inline]
    fn name(&self) -> &'static str {
        "Monte-Carlo"
    }

    fn call_option_price(&mut self) -> f64 {
        self.estimate(OptionKind::Call).price
    }

    fn put_option_price(&mut self) -> f64 {
        self.estimate(OptionKind::Put).price
    }
}
