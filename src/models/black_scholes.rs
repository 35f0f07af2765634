use crate::errors::PricerResult;
use crate::inputs::PricingInputs;
use crate::models::OptionPricer;
use statrs::distribution::{ContinuousCDF, Normal};

/// Closed-form Black-Scholes pricing for European options.
///
/// call = S * Phi(d1) - K * e^{-rT} * Phi(d2)
/// put  = K * e^{-rT} * Phi(-d2) - S * Phi(-d1)
///
/// where d1 = (ln(S/K) + T * (r + sigma^2/2)) / (sigma * sqrt(T))
/// and d2 = d1 - sigma * sqrt(T).
#[derive(Debug, Clone)]
pub struct AnalyticPricer {
    inputs: PricingInputs,
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl AnalyticPricer {
    pub fn new(inputs: PricingInputs) -> PricerResult<Self> {
        inputs.validate()?;
        Ok(Self {
            inputs,
            normal: Normal::standard(),
        })
    }

    #[inline]
    fn sigma_sqrt_t(&self) -> f64 {
        self.inputs.volatility * self.inputs.time_to_expiry.sqrt()
    }

    pub fn d1(&self) -> f64 {
        let p = &self.inputs;
        ((p.underlying_price / p.strike_price).ln()
            + p.time_to_expiry * (p.risk_free_rate + p.volatility * p.volatility / 2.0))
            / self.sigma_sqrt_t()
    }

    pub fn d2(&self) -> f64 {
        self.d1() - self.sigma_sqrt_t()
    }

    /// Zero volatility: the underlying grows at the risk-free rate, so the
    /// option is worth its discounted intrinsic value against the forward.
    fn degenerate(&self) -> bool {
        self.sigma_sqrt_t() < 1e-12
    }
}

impl OptionPricer for AnalyticPricer {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn call_option_price(&mut self) -> f64 {
        if self.degenerate() {
            return self.inputs.forward_parity().max(0.0);
        }
        let p = &self.inputs;
        p.underlying_price * self.normal.cdf(self.d1())
            - p.strike_price * p.discount_factor() * self.normal.cdf(self.d2())
    }

    fn put_option_price(&mut self) -> f64 {
        if self.degenerate() {
            return (-self.inputs.forward_parity()).max(0.0);
        }
        let p = &self.inputs;
        p.strike_price * p.discount_factor() * self.normal.cdf(-self.d2())
            - p.underlying_price * self.normal.cdf(-self.d1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricer(s: f64, v: f64, k: f64, t: f64, r: f64) -> AnalyticPricer {
        AnalyticPricer::new(PricingInputs::new(s, v, k, t, r).unwrap()).unwrap()
    }

    #[test]
    fn test_textbook_atm_values() {
        let mut bs = pricer(100.0, 0.2, 100.0, 1.0, 0.05);
        let call = bs.call_option_price();
        let put = bs.put_option_price();
        assert!((call - 10.450583572185565).abs() < 1e-6, "call={call}");
        assert!((put - 5.573526022256971).abs() < 1e-6, "put={put}");
    }

    #[test]
    fn test_put_call_parity_exact() {
        let mut bs = pricer(42.0, 0.35, 40.0, 0.75, 0.03);
        let inputs = PricingInputs::new(42.0, 0.35, 40.0, 0.75, 0.03).unwrap();
        let lhs = bs.call_option_price() - bs.put_option_price();
        assert!((lhs - inputs.forward_parity()).abs() < 1e-9, "parity gap {lhs}");
    }

    #[test]
    fn test_deep_itm_call_near_forward() {
        let mut bs = pricer(200.0, 0.2, 100.0, 1.0, 0.05);
        let call = bs.call_option_price();
        let intrinsic = 200.0 - 100.0 * (-0.05f64).exp();
        assert!((call - intrinsic).abs() < 0.01, "deep ITM call={call}");
        assert!(bs.put_option_price() < 1e-3);
    }

    #[test]
    fn test_zero_volatility_limit() {
        let mut bs = pricer(100.0, 0.0, 100.0, 1.0, 0.05);
        let expected = 100.0 - 100.0 * (-0.05f64).exp();
        assert!((bs.call_option_price() - expected).abs() < 1e-12);
        assert_eq!(bs.put_option_price(), 0.0);
    }

    #[test]
    fn test_d2_below_d1() {
        let bs = pricer(100.0, 0.2, 100.0, 1.0, 0.05);
        assert!((bs.d1() - 0.35).abs() < 1e-12);
        assert!((bs.d1() - bs.d2() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let inputs = PricingInputs {
            underlying_price: 100.0,
            volatility: 0.2,
            strike_price: 0.0,
            time_to_expiry: 1.0,
            risk_free_rate: 0.05,
        };
        assert!(AnalyticPricer::new(inputs).is_err());
    }
}
