pub mod binomial;
pub mod black_scholes;
pub mod monte_carlo;

use crate::config::{AppConfig, ModelChoice};
use crate::errors::PricerResult;
use binomial::LatticePricer;
use black_scholes::AnalyticPricer;
use monte_carlo::SimulationPricer;

/// Vanilla European exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Exercise value at expiry for an underlying price.
    #[inline]
    pub fn payoff(self, price: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (price - strike).max(0.0),
            OptionKind::Put => (strike - price).max(0.0),
        }
    }
}

/// All pricers implement this trait.
/// Takes `&mut self` because the lattice pricer replaces the tree it owns on every call.
pub trait OptionPricer {
    fn name(&self) -> &'static str;

    fn call_option_price(&mut self) -> f64;

    fn put_option_price(&mut self) -> f64;

    fn price(&mut self, kind: OptionKind) -> f64 {
        match kind {
            OptionKind::Call => self.call_option_price(),
            OptionKind::Put => self.put_option_price(),
        }
    }

    /// Call then put, the order the driver reports them in.
    fn quote(&mut self) -> PriceQuote {
        let call = self.call_option_price();
        let put = self.put_option_price();
        PriceQuote {
            model: self.name(),
            call,
            put,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceQuote {
    pub model: &'static str,
    pub call: f64,
    pub put: f64,
}

/// One of the three pricers, selected at runtime.
#[derive(Debug)]
pub enum Pricer {
    Analytic(AnalyticPricer),
    Lattice(LatticePricer),
    Simulation(SimulationPricer),
}

impl Pricer {
    pub fn from_config(cfg: &AppConfig) -> PricerResult<Self> {
        let pricer = match cfg.model {
            ModelChoice::BlackScholes => Pricer::Analytic(AnalyticPricer::new(cfg.inputs)?),
            ModelChoice::Binomial => Pricer::Lattice(LatticePricer::with_scheme(
                cfg.inputs,
                cfg.steps,
                cfg.probability_scheme,
            )?),
            ModelChoice::MonteCarlo => {
                let mut mc = SimulationPricer::new(cfg.inputs, cfg.simulations)?;
                if let Some(seed) = cfg.seed {
                    mc = mc.with_seed(seed);
                }
                Pricer::Simulation(mc)
            }
        };
        tracing::debug!(model = pricer.name(), "pricer constructed");
        Ok(pricer)
    }
}

impl OptionPricer for Pricer {
    fn name(&self) -> &'static str {
        match self {
            Pricer::Analytic(p) => p.name(),
            Pricer::Lattice(p) => p.name(),
            Pricer::Simulation(p) => p.name(),
        }
    }

    fn call_option_price(&mut self) -> f64 {
        match self {
            Pricer::Analytic(p) => p.call_option_price(),
            Pricer::Lattice(p) => p.call_option_price(),
            Pricer::Simulation(p) => p.call_option_price(),
        }
    }

    fn put_option_price(&mut self) -> f64 {
        match self {
            Pricer::Analytic(p) => p.put_option_price(),
            Pricer::Lattice(p) => p.put_option_price(),
            Pricer::Simulation(p) => p.put_option_price(),
        }
    }
}
