//! Cross-model properties: parity, convergence of the lattice to the closed
//! form, and agreement between the three pricers on shared inputs.

use approx::assert_abs_diff_eq;
use option_pricer::{
    AnalyticPricer, LatticePricer, OptionPricer, PricerError, PricingInputs, ProbabilityScheme,
    SimulationPricer,
};

fn atm() -> PricingInputs {
    PricingInputs::new(100.0, 0.2, 100.0, 1.0, 0.05).unwrap()
}

fn scenarios() -> Vec<PricingInputs> {
    vec![
        atm(),
        PricingInputs::new(100.0, 0.25, 110.0, 0.5, 0.03).unwrap(),
        PricingInputs::new(80.0, 0.4, 75.0, 2.0, 0.01).unwrap(),
    ]
}

// ============================================================================
// Put-call parity
// ============================================================================

#[test]
fn test_parity_analytic() {
    for inputs in scenarios() {
        let mut bs = AnalyticPricer::new(inputs).unwrap();
        let gap = bs.call_option_price() - bs.put_option_price();
        assert_abs_diff_eq!(gap, inputs.forward_parity(), epsilon = 1e-9);
    }
}

#[test]
fn test_parity_lattice_per_step() {
    for inputs in scenarios() {
        for steps in [3, 8, 12] {
            let mut lattice =
                LatticePricer::with_scheme(inputs, steps, ProbabilityScheme::PerStep).unwrap();
            let gap = lattice.call_option_price() - lattice.put_option_price();
            assert_abs_diff_eq!(gap, inputs.forward_parity(), epsilon = 1e-9);
        }
    }
}

#[test]
fn test_parity_simulation() {
    let inputs = atm();
    let mut mc = SimulationPricer::new(inputs, 200_000).unwrap().with_seed(2024);
    let gap = mc.call_option_price() - mc.put_option_price();
    assert_abs_diff_eq!(gap, inputs.forward_parity(), epsilon = 0.25);
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn test_lattice_converges_to_closed_form() {
    let inputs = atm();
    let mut bs = AnalyticPricer::new(inputs).unwrap();
    let (bs_call, bs_put) = (bs.call_option_price(), bs.put_option_price());

    let mut prev_err = f64::INFINITY;
    for (steps, bound) in [(5, 0.4), (10, 0.25), (15, 0.15)] {
        let mut lattice =
            LatticePricer::with_scheme(inputs, steps, ProbabilityScheme::PerStep).unwrap();
        let call_err = (lattice.call_option_price() - bs_call).abs();
        let put_err = (lattice.put_option_price() - bs_put).abs();

        assert!(call_err < bound, "steps={steps} call_err={call_err}");
        assert!(put_err < bound, "steps={steps} put_err={put_err}");
        assert!(call_err < prev_err, "error grew at steps={steps}");
        prev_err = call_err;
    }
}

#[test]
fn test_remaining_time_scheme_does_not_converge() {
    let inputs = atm();
    let bs_call = AnalyticPricer::new(inputs).unwrap().call_option_price();
    let mut lattice = LatticePricer::new(inputs, 5).unwrap();
    let call = lattice.call_option_price();
    assert!((call - bs_call).abs() > 1.0, "call={call} bs={bs_call}");
}

#[test]
fn test_schemes_agree_for_one_step() {
    for inputs in scenarios() {
        let mut a = LatticePricer::with_scheme(inputs, 1, ProbabilityScheme::RemainingTime).unwrap();
        let mut b = LatticePricer::with_scheme(inputs, 1, ProbabilityScheme::PerStep).unwrap();
        assert_eq!(a.call_option_price().to_bits(), b.call_option_price().to_bits());
        assert_eq!(a.put_option_price().to_bits(), b.put_option_price().to_bits());
    }
}

#[test]
fn test_simulation_near_closed_form() {
    for inputs in scenarios() {
        let mut bs = AnalyticPricer::new(inputs).unwrap();
        let mut mc = SimulationPricer::new(inputs, 200_000).unwrap().with_seed(11);
        assert_abs_diff_eq!(mc.call_option_price(), bs.call_option_price(), epsilon = 0.45);
        assert_abs_diff_eq!(mc.put_option_price(), bs.put_option_price(), epsilon = 0.45);
    }
}

// ============================================================================
// Determinism and rejection
// ============================================================================

#[test]
fn test_lattice_deterministic_across_instances() {
    let mut a = LatticePricer::new(atm(), 10).unwrap();
    let mut b = LatticePricer::new(atm(), 10).unwrap();
    let first = a.call_option_price();
    assert_eq!(first.to_bits(), a.call_option_price().to_bits());
    assert_eq!(first.to_bits(), b.call_option_price().to_bits());
}

#[test]
fn test_invalid_lattice_inputs_rejected() {
    assert!(matches!(
        LatticePricer::new(atm(), 0),
        Err(PricerError::InvalidParameter(_))
    ));
    assert!(matches!(
        PricingInputs::new(100.0, 0.2, 100.0, 0.0, 0.05),
        Err(PricerError::InvalidParameter(_))
    ));
    assert!(matches!(
        SimulationPricer::new(atm(), 0),
        Err(PricerError::InvalidParameter(_))
    ));
}

#[test]
fn test_quote_through_trait_object() {
    let mut pricers: Vec<Box<dyn OptionPricer>> = vec![
        Box::new(AnalyticPricer::new(atm()).unwrap()),
        Box::new(LatticePricer::with_scheme(atm(), 12, ProbabilityScheme::PerStep).unwrap()),
        Box::new(SimulationPricer::new(atm(), 100_000).unwrap().with_seed(5)),
    ];
    let names: Vec<&str> = pricers.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["Black-Scholes", "Binomial", "Monte-Carlo"]);

    for p in pricers.iter_mut() {
        let q = p.quote();
        assert!(q.call > 9.5 && q.call < 11.5, "{} call={}", q.model, q.call);
        assert!(q.put > 4.5 && q.put < 6.5, "{} put={}", q.model, q.put);
    }
}
