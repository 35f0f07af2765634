pub mod config;
pub mod errors;
pub mod inputs;
pub mod models;

pub use errors::{PricerError, PricerResult};
pub use inputs::PricingInputs;
pub use models::binomial::{LatticePricer, ProbabilityScheme};
pub use models::black_scholes::AnalyticPricer;
pub use models::monte_carlo::SimulationPricer;
pub use models::{OptionKind, OptionPricer, PriceQuote, Pricer};
