use uncertain_gum::distributions::{from_expanded, uniform};
use uncertain_gum::{INF, Result, Session, correlation_matrix};

/// Length Calibration of a Gauge Block
///
/// Combines a Type-A estimate from repeated comparator readings with Type-B
/// contributions from a reference certificate and a thermometer, including a
/// correlation between two temperature readings taken with the same sensor.
#[allow(clippy::cast_precision_loss)]
fn main() -> Result<()> {
    println!("📏 Gauge Block Calibration");
    println!("==========================\n");

    let session = Session::new();

    // comparator differences, nm
    let readings = [215.0, 212.0, 218.0, 214.0, 216.0, 213.0, 217.0, 215.0];
    let difference = session.type_a(&readings)?.with_label("d");
    println!(
        "   Comparator: d = {:.1} nm ± {:.2} nm (ν = {})",
        difference.value(),
        difference.u()?,
        difference.dof()?
    );

    // certificate states U = 25 nm at k = 2
    let reference = session.ureal_labeled(50_000_623.0, from_expanded(25.0, 2.0)?, 18.0, "L_s")?;

    // thermal expansion, 11.5e-6 /K with a ±2e-6 rectangular bound
    let alpha = session.ureal_labeled(11.5e-6, uniform(2e-6)?, INF, "α")?;
    let t_block = session.ureal_labeled(20.3, 0.05, 12.0, "t")?;
    let t_reference = session.ureal_labeled(20.1, 0.05, 12.0, "t_s")?;
    session.correlate(&t_block, &t_reference, 0.8)?;

    let delta_t = (&t_block - &t_reference)?;
    let expansion = session.result_labeled(&(&reference * &(&alpha * &delta_t)?)?, "ΔL_θ")?;
    let length = (&reference + &difference)?.try_sub(&expansion)?.with_label("L");

    println!("\n📐 Result:");
    println!("   L = {:.1} nm", length.value());
    println!("   u(L) = {:.2} nm", length.u()?);
    println!("   ν_eff = {:.1}", length.dof()?);

    println!("\n📋 Budget:");
    for row in length.components()? {
        println!(
            "   {:>4}  u_i = {:+.3} nm",
            row.label.unwrap_or_default(),
            row.u_component
        );
    }

    println!(
        "   {:>4}  u_i = {:+.3} nm (intermediate)",
        expansion.label().unwrap_or_default(),
        length.u_component(&expansion)?
    );

    let numbers = [length.clone(), delta_t, difference];
    println!("\n🔗 Correlation matrix (L, Δt, d):");
    for row in correlation_matrix(&numbers)? {
        let cells: Vec<String> = row.iter().map(|r| format!("{r:+.3}")).collect();
        println!("   [{}]", cells.join(", "));
    }

    Ok(())
}
