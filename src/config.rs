use crate::errors::{PricerError, PricerResult};
use crate::inputs::PricingInputs;
use crate::models::binomial::ProbabilityScheme;
use std::str::FromStr;

const DEFAULT_STEPS: &str = "5";
const DEFAULT_SIMULATIONS: &str = "100000";

/// Which pricer the driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelChoice {
    BlackScholes,
    Binomial,
    MonteCarlo,
}

impl FromStr for ModelChoice {
    type Err = PricerError;

    /// Accepts the menu numbers (1-3) as well as names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "black-scholes" | "blackscholes" | "analytic" => Ok(Self::BlackScholes),
            "2" | "binomial" | "lattice" => Ok(Self::Binomial),
            "3" | "monte-carlo" | "montecarlo" | "simulation" => Ok(Self::MonteCarlo),
            other => Err(PricerError::InvalidModel(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlackScholes => write!(f, "black-scholes"),
            Self::Binomial => write!(f, "binomial"),
            Self::MonteCarlo => write!(f, "monte-carlo"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(PricerError::Config(format!("PRICER_OUTPUT: unknown format {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelChoice,
    pub inputs: PricingInputs,
    pub steps: usize,
    pub probability_scheme: ProbabilityScheme,
    pub simulations: usize,
    pub seed: Option<u64>,
    pub output: OutputFormat,
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. `from_env` plugs in the
    /// process environment; tests plug in a map.
    pub fn from_lookup<F>(lookup: F) -> PricerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = |key: &str| -> PricerResult<String> {
            lookup(key).ok_or_else(|| PricerError::Config(format!("missing env var: {key}")))
        };
        let env_var_or = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        // Model first, so a bad choice is reported as such even if the rest is missing.
        let model = env_var("PRICER_MODEL")?.parse::<ModelChoice>()?;

        let inputs = PricingInputs::new(
            parse_f64("PRICER_UNDERLYING_PRICE", &env_var("PRICER_UNDERLYING_PRICE")?)?,
            parse_f64("PRICER_VOLATILITY", &env_var("PRICER_VOLATILITY")?)?,
            parse_f64("PRICER_STRIKE_PRICE", &env_var("PRICER_STRIKE_PRICE")?)?,
            parse_f64("PRICER_TIME_TO_EXPIRY", &env_var("PRICER_TIME_TO_EXPIRY")?)?,
            parse_f64("PRICER_RISK_FREE_RATE", &env_var("PRICER_RISK_FREE_RATE")?)?,
        )?;

        let steps = env_var_or("PRICER_STEPS", DEFAULT_STEPS)
            .trim()
            .parse::<usize>()
            .map_err(|e| PricerError::Config(format!("PRICER_STEPS: {e}")))?;

        let probability_scheme = env_var_or("PRICER_PROBABILITY_SCHEME", "remaining-time")
            .parse::<ProbabilityScheme>()?;

        let simulations = env_var_or("PRICER_SIMULATIONS", DEFAULT_SIMULATIONS)
            .trim()
            .parse::<usize>()
            .map_err(|e| PricerError::Config(format!("PRICER_SIMULATIONS: {e}")))?;

        let seed = lookup("PRICER_SEED")
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .map_err(|e| PricerError::Config(format!("PRICER_SEED: {e}")))
            })
            .transpose()?;

        let output = env_var_or("PRICER_OUTPUT", "text").parse::<OutputFormat>()?;

        Ok(Self {
            model,
            inputs,
            steps,
            probability_scheme,
            simulations,
            seed,
            output,
        })
    }
}

fn parse_f64(key: &str, raw: &str) -> PricerResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| PricerError::Config(format!("{key}: {e}")))
}
