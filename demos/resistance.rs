use tracing::Level;
use uncertain_gum::computation::GraphVisualizer;
use uncertain_gum::{INF, Result, Session};

/// Resistance from Voltage and Current
///
/// Propagates the uncertainty of a voltmeter and an ammeter reading into
/// Ohm's-law resistance, then prints the uncertainty budget and the
/// computation graph.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::DEBUG)
        .init();

    println!("⚡ Resistance Measurement");
    println!("========================\n");

    let session = Session::new();
    let v = session.ureal_labeled(0.1, 1e-3, INF, "V")?; // volts
    let i = session.ureal_labeled(0.015, 0.5e-3, INF, "I")?; // amperes

    let r = (&v / &i)?.with_label("R");
    println!("   V = {:.4} V ± {:.4} V", v.value(), v.u()?);
    println!("   I = {:.4} A ± {:.4} A", i.value(), i.u()?);
    println!("   R = {:.3} Ω ± {:.3} Ω", r.value(), r.u()?);
    println!("   ν_eff = {}", r.dof()?);

    println!("\n📋 Uncertainty budget:");
    for row in r.components()? {
        println!(
            "   {:>2}  c = {:+10.3}  u_i(R) = {:+.4} Ω",
            row.label.as_deref().unwrap_or("?"),
            row.sensitivity,
            row.u_component
        );
    }

    // power dissipated, correlated with R through both inputs
    let p = (&v * &i)?;
    println!("\n🔥 Power: {:.5} W ± {:.5} W", p.value(), p.u()?);
    println!("   r(R, P) = {:.3}", r.correlation(&p)?);

    println!("\n🌳 Computation graph of R:");
    print!("{}", GraphVisualizer::render_tree(r.node()));
    println!("\n{}", GraphVisualizer::to_dot(r.node()));

    Ok(())
}
