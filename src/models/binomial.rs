use crate::errors::{invalid, PricerError, PricerResult};
use crate::inputs::PricingInputs;
use crate::models::{OptionKind, OptionPricer};
use std::ops::Range;
use std::str::FromStr;

/// Above this many steps the 2^n node count gets expensive; we log it.
const WARN_STEPS: usize = 24;

/// Index into the lattice arena.
pub type NodeId = usize;

/// How the risk-neutral up probability is derived at each level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbabilityScheme {
    /// p = (e^{r * tau} - d) / (u - d), with tau the time remaining at the
    /// level being combined (T at the root, shrinking by dt per level).
    /// Does not converge to Black-Scholes as n grows.
    #[default]
    RemainingTime,
    /// Cox-Ross-Rubinstein: p = (e^{r * dt} - d) / (u - d) at every level.
    PerStep,
}

impl FromStr for ProbabilityScheme {
    type Err = PricerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remaining-time" | "remaining" => Ok(Self::RemainingTime),
            "per-step" | "crr" => Ok(Self::PerStep),
            other => Err(PricerError::Config(format!(
                "PRICER_PROBABILITY_SCHEME: unknown scheme {other}"
            ))),
        }
    }
}

/// Lattice geometry, derived once from the inputs and the step count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeConfig {
    pub steps: usize,
    pub step_size: f64,
    pub up_factor: f64,
    pub down_factor: f64,
    pub scheme: ProbabilityScheme,
}

impl LatticeConfig {
    pub fn new(
        inputs: &PricingInputs,
        steps: usize,
        scheme: ProbabilityScheme,
    ) -> PricerResult<Self> {
        if steps == 0 {
            return Err(invalid("steps must be > 0, got 0"));
        }
        inputs.validate()?;
        // u == d would divide by zero in the probability.
        if inputs.volatility == 0.0 {
            return Err(invalid("binomial lattice needs volatility > 0, got 0"));
        }

        let step_size = inputs.time_to_expiry / steps as f64;
        let up_factor = (inputs.volatility * step_size.sqrt()).exp();
        Ok(Self {
            steps,
            step_size,
            up_factor,
            down_factor: 1.0 / up_factor,
            scheme,
        })
    }

    /// Risk-neutral probability of an up move for a level whose remaining
    /// time to expiry is `remaining_time`.
    #[inline]
    pub fn up_probability(&self, risk_free_rate: f64, remaining_time: f64) -> f64 {
        let period = match self.scheme {
            ProbabilityScheme::RemainingTime => remaining_time,
            ProbabilityScheme::PerStep => self.step_size,
        };
        ((risk_free_rate * period).exp() - self.down_factor) / (self.up_factor - self.down_factor)
    }
}

/// Total nodes of a full binary tree of depth `steps`, if it is addressable.
fn node_count(steps: usize) -> Option<usize> {
    let shift = u32::try_from(steps.checked_add(1)?).ok()?;
    let count = 1usize.checked_shl(shift)?.checked_sub(1)?;
    // The arena must fit within isize::MAX bytes.
    let bytes = count.checked_mul(std::mem::size_of::<LatticeNode>())?;
    (bytes <= isize::MAX as usize).then_some(count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Children {
    pub down: NodeId,
    pub up: NodeId,
}

/// A node is either terminal (`children == None`, at depth `steps`) or has
/// exactly two children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeNode {
    /// Simulated underlying price if this node is reached.
    pub price: f64,
    /// Option value after backward induction.
    pub value: f64,
    pub children: Option<Children>,
}

impl LatticeNode {
    fn new(price: f64) -> Self {
        Self {
            price,
            value: 0.0,
            children: None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.children.is_none()
    }
}

/// The tree a [`LatticePricer`] builds and owns.
///
/// A full binary tree: every path is kept, even where prices coincide
/// (up-then-down == down-then-up), so `n` steps hold `2^(n+1) - 1` nodes.
/// Callers should keep `n` at or below roughly 20-25.
///
/// Nodes live in one arena in level order. Level `k` occupies
/// `[2^k - 1, 2^(k+1) - 1)` and the children of node `i` are `2i + 1` (down)
/// and `2i + 2` (up). Build and backward induction are both level sweeps,
/// so stack depth does not grow with `n`. Dropping the lattice releases
/// every node once, with the arena.
#[derive(Debug, Clone)]
pub struct Lattice {
    nodes: Vec<LatticeNode>,
    steps: usize,
}

impl Lattice {
    /// Forward pass: lay out every level, down child before up child.
    fn populate(config: &LatticeConfig, root_price: f64, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(LatticeNode::new(root_price));

        for level in 0..config.steps {
            for id in Self::level_range(level) {
                let price = nodes[id].price;
                let down = nodes.len();
                nodes.push(LatticeNode::new(price * config.down_factor));
                nodes.push(LatticeNode::new(price * config.up_factor));
                nodes[id].children = Some(Children { down, up: down + 1 });
            }
        }

        Self {
            nodes,
            steps: config.steps,
        }
    }

    /// Backward induction. The probability for a level is taken from that
    /// level's remaining time; the next level down sees it reduced by one step.
    fn propagate(&mut self, config: &LatticeConfig, inputs: &PricingInputs, kind: OptionKind) {
        let mut remaining = Vec::with_capacity(self.steps + 1);
        let mut remaining_time = inputs.time_to_expiry;
        for _ in 0..=self.steps {
            remaining.push(remaining_time);
            remaining_time -= config.step_size;
        }

        for id in Self::level_range(self.steps) {
            let node = &mut self.nodes[id];
            node.value = kind.payoff(node.price, inputs.strike_price);
        }

        let discount = (-inputs.risk_free_rate * config.step_size).exp();
        for level in (0..self.steps).rev() {
            let up_prob = config.up_probability(inputs.risk_free_rate, remaining[level]);
            let down_prob = 1.0 - up_prob;
            for id in Self::level_range(level) {
                if let Some(Children { down, up }) = self.nodes[id].children {
                    let expected = up_prob * self.nodes[up].value + down_prob * self.nodes[down].value;
                    self.nodes[id].value = discount * expected;
                }
            }
        }
    }

    #[inline]
    fn level_range(level: usize) -> Range<NodeId> {
        ((1 << level) - 1)..((1 << (level + 1)) - 1)
    }

    pub fn root(&self) -> &LatticeNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&LatticeNode> {
        self.nodes.get(id)
    }

    /// Nodes at time step `level` (0 = root), empty past expiry.
    pub fn level(&self, level: usize) -> &[LatticeNode] {
        if level > self.steps {
            return &[];
        }
        &self.nodes[Self::level_range(level)]
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn terminal_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_terminal()).count()
    }

    pub fn terminal_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.level(self.steps).iter().map(|n| n.price)
    }
}

/// Binomial pricer. Builds a fresh lattice per pricing call and keeps the
/// most recent one until the next call or until it is dropped.
#[derive(Debug)]
pub struct LatticePricer {
    inputs: PricingInputs,
    config: LatticeConfig,
    node_count: usize,
    lattice: Option<Lattice>,
}

impl LatticePricer {
    pub fn new(inputs: PricingInputs, steps: usize) -> PricerResult<Self> {
        Self::with_scheme(inputs, steps, ProbabilityScheme::default())
    }

    pub fn with_scheme(
        inputs: PricingInputs,
        steps: usize,
        scheme: ProbabilityScheme,
    ) -> PricerResult<Self> {
        let config = LatticeConfig::new(&inputs, steps, scheme)?;
        let node_count = node_count(steps)
            .ok_or_else(|| invalid(format!("steps = {steps} is too large to build a lattice")))?;

        if steps > WARN_STEPS {
            tracing::warn!(steps, node_count, "binomial lattice is exponential in steps");
        }

        Ok(Self {
            inputs,
            config,
            node_count,
            lattice: None,
        })
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// The lattice built by the last pricing call, if any.
    pub fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    fn price_with(&mut self, kind: OptionKind) -> f64 {
        // Release the previous tree before allocating the next one.
        self.lattice = None;

        let mut lattice = Lattice::populate(&self.config, self.inputs.underlying_price, self.node_count);
        lattice.propagate(&self.config, &self.inputs, kind);
        let value = lattice.root().value;

        tracing::debug!(
            ?kind,
            steps = self.config.steps,
            nodes = lattice.len(),
            value,
            "lattice priced"
        );
        self.lattice = Some(lattice);
        value
    }
}

impl OptionPricer for LatticePricer {
    #[inline]
    fn name(&self) -> &'static str {
        "Binomial"
    }

    fn call_option_price(&mut self) -> f64 {
        self.price_with(OptionKind::Call)
    }

    fn put_option_price(&mut self) -> f64 {
        self.price_with(OptionKind::Put)
    }
}
