//! Property checks over generated inputs
//!
//! Values, standard uncertainties and correlation coefficients are drawn by
//! proptest strategies; failing cases are shrunk and persisted by proptest.

use proptest::prelude::*;
use uncertain_gum::{INF, Result, Session, UncertainReal};

fn expression(a: &UncertainReal, b: &UncertainReal, c: &UncertainReal) -> Result<UncertainReal> {
    // a·exp(b) / (c² + 1) + sin(a - b)
    let numerator = a.try_mul(&b.exp()?)?;
    let denominator = c.square()?.try_add(1.0)?;
    numerator.try_div(&denominator)?.try_add(&a.try_sub(b)?.sin()?)
}

fn values() -> impl Strategy<Value = [f64; 3]> {
    (-3.0_f64..3.0, -1.0_f64..1.0, -2.0_f64..2.0).prop_map(|(a, b, c)| [a, b, c])
}

fn uncertainties() -> impl Strategy<Value = [f64; 3]> {
    [0.01_f64..0.5, 0.01_f64..0.5, 0.01_f64..0.5]
}

fn inputs(session: &Session, values: [f64; 3], uncertainties: [f64; 3]) -> [UncertainReal; 3] {
    let [a, b, c] = values;
    let [ua, ub, uc] = uncertainties;
    [
        session.ureal(a, ua, INF).unwrap(),
        session.ureal(b, ub, INF).unwrap(),
        session.ureal(c, uc, INF).unwrap(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn covariance_is_symmetric(
        values in values(),
        uncertainties in uncertainties(),
        r_ab in -0.9_f64..0.9,
        r_bc in -0.4_f64..0.4,
    ) {
        let session = Session::new();
        let [a, b, c] = inputs(&session, values, uncertainties);
        session.correlate(&a, &b, r_ab).unwrap();
        session.correlate(&b, &c, r_bc).unwrap();

        let u = expression(&a, &b, &c).unwrap();
        let v = (&a * &c).unwrap().cos().unwrap();
        let w = (&b - &c).unwrap();

        for (x, y) in [(&u, &v), (&u, &w), (&v, &w), (&u, &a)] {
            let forward = x.covariance(y).unwrap();
            let backward = y.covariance(x).unwrap();
            let scale = x.u().unwrap() * y.u().unwrap();
            prop_assert!(
                (forward - backward).abs() <= 1e-12 * scale.max(1.0),
                "covariance not symmetric: {} vs {}", forward, backward
            );
        }

        let variance = u.variance().unwrap();
        prop_assert!(variance >= 0.0);
        prop_assert!((u.covariance(&u).unwrap() - variance).abs() <= 1e-12 * variance.max(1.0));
    }

    #[test]
    fn sensitivities_match_central_differences(
        values in values(),
        uncertainties in uncertainties(),
    ) {
        let step = 1e-6;
        let session = Session::new();
        let [a, b, c] = inputs(&session, values, uncertainties);
        let y = expression(&a, &b, &c).unwrap();

        let shifted = |k: usize, delta: f64| {
            let mut moved = values;
            moved[k] += delta;
            let [sa, sb, sc] = moved.map(|value| session.constant(value).unwrap());
            expression(&sa, &sb, &sc).unwrap().value()
        };

        for (k, input) in [&a, &b, &c].into_iter().enumerate() {
            let numeric = (shifted(k, step) - shifted(k, -step)) / (2.0 * step);
            let analytic = y.sensitivity(input).unwrap();
            prop_assert!(
                (numeric - analytic).abs() <= 1e-5 * analytic.abs().max(1.0),
                "input {}: analytic {}, numeric {}", k, analytic, numeric
            );
        }
    }

    #[test]
    fn independent_sums_add_in_quadrature(
        x in -100.0_f64..100.0,
        y in -100.0_f64..100.0,
        sigma_x in 0.0_f64..10.0,
        sigma_y in 0.0_f64..10.0,
    ) {
        let session = Session::new();
        let a = session.ureal(x, sigma_x, INF).unwrap();
        let b = session.ureal(y, sigma_y, INF).unwrap();

        let expected = sigma_x.hypot(sigma_y);
        let total = (&a + &b).unwrap();
        prop_assert!((total.u().unwrap() - expected).abs() <= 1e-12 * expected.max(1.0));
    }

    #[test]
    fn correlated_pair_stays_within_bounds(
        ux in 0.01_f64..0.5,
        uy in 0.01_f64..0.5,
        r in -0.99_f64..0.99,
    ) {
        let session = Session::new();
        let a = session.ureal(1.0, ux, INF).unwrap();
        let b = session.ureal(2.0, uy, INF).unwrap();
        session.correlate(&a, &b, r).unwrap();

        let total = (&a + &b).unwrap();
        let expected = (ux * ux + uy * uy + 2.0 * r * ux * uy).sqrt();
        prop_assert!((total.u().unwrap() - expected).abs() <= 1e-12);
        prop_assert!(total.u().unwrap() <= ux + uy + 1e-12);
        prop_assert!((a.correlation(&b).unwrap() - r).abs() <= 1e-12);
    }
}
