use crate::errors::{invalid, PricerResult};

/// Immutable parameter bundle shared by every pricer.
///
/// Volatility and rate are decimal fractions (0.2 = 20%), time is in years.
/// Fields are public so the bundle can be deserialized or built literally;
/// every pricer constructor re-runs [`PricingInputs::validate`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricingInputs {
    pub underlying_price: f64,
    pub volatility: f64,
    pub strike_price: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
}

impl PricingInputs {
    pub fn new(
        underlying_price: f64,
        volatility: f64,
        strike_price: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
    ) -> PricerResult<Self> {
        let inputs = Self {
            underlying_price,
            volatility,
            strike_price,
            time_to_expiry,
            risk_free_rate,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Reject anything no pricer can work with.
    pub fn validate(&self) -> PricerResult<()> {
        let fields = [
            ("underlying_price", self.underlying_price),
            ("volatility", self.volatility),
            ("strike_price", self.strike_price),
            ("time_to_expiry", self.time_to_expiry),
            ("risk_free_rate", self.risk_free_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.underlying_price <= 0.0 {
            return Err(invalid(format!(
                "underlying_price must be > 0, got {}",
                self.underlying_price
            )));
        }
        if self.strike_price <= 0.0 {
            return Err(invalid(format!(
                "strike_price must be > 0, got {}",
                self.strike_price
            )));
        }
        if self.time_to_expiry <= 0.0 {
            return Err(invalid(format!(
                "time_to_expiry must be > 0, got {}",
                self.time_to_expiry
            )));
        }
        if self.volatility < 0.0 {
            return Err(invalid(format!(
                "volatility must be >= 0, got {}",
                self.volatility
            )));
        }
        Ok(())
    }

    /// e^{-rT}
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }

    /// S - K e^{-rT}, the value every call/put pair must differ by.
    #[inline]
    pub fn forward_parity(&self) -> f64 {
        self.underlying_price - self.strike_price * self.discount_factor()
    }
}
