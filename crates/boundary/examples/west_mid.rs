//! "West Mid" closure walkthrough.
//!
//! Purpose
//! - Analyse an eleven-edge lot where one edge ("West Mid") was only read as
//!   a 7-10 ft range, then recover the length that closes the boundary.
//!
//! Run with `cargo run -p boundary --example west_mid`.

use boundary::analysis::{analyze_edges_with_uncertainty, edge_ranges, EdgeInput};
use boundary::caps::Capabilities;
use boundary::geom::{BoundaryCfg, EdgeDirection::*};
use boundary::montecarlo::McCfg;
use boundary::resolve::resolve_edge;

fn edges(west_mid: impl Into<boundary::analysis::LengthInput>) -> Vec<EdgeInput> {
    vec![
        EdgeInput::new("East", Right, 31.4),
        EdgeInput::new("South Upper", Down, 22.5),
        EdgeInput::new("GATE", Down, 6.0),
        EdgeInput::new("14.4 Wall", Left, 14.4),
        EdgeInput::new("South Lower", Down, 27.3),
        EdgeInput::new("West Bottom", Left, 12.0),
        EdgeInput::new("Step", Up, 4.2),
        EdgeInput::new("West Mid", Left, west_mid),
        EdgeInput::new("North Lower", Up, 26.6),
        EdgeInput::new("Indent", Right, 2.9),
        EdgeInput::new("North Upper", Up, 25.0),
    ]
}

fn main() -> boundary::Result<()> {
    let cfg = BoundaryCfg::default();
    let mc = McCfg::default();
    let mut caps = Capabilities::seeded(2024);

    let ranged = edges([7.0, 10.0]);
    let analysis = analyze_edges_with_uncertainty(&ranged, "FT", &mc, &cfg, &mut caps)?;
    let p = &analysis.perimeter;
    println!(
        "perimeter: {} FT ± {} (95% CI {} - {})",
        p.best_estimate, p.uncertainty, p.ci_95[0], p.ci_95[1]
    );
    let a = &analysis.area;
    println!(
        "area:      {} sq FT ± {} (95% CI {} - {})",
        a.best_estimate, a.uncertainty, a.ci_95[0], a.ci_95[1]
    );
    println!(
        "closure gap with West Mid at its midpoint: {} FT",
        analysis.closure.total_error
    );

    let resolution = resolve_edge(&edge_ranges(&ranged, "FT")?, 7, 0.0, &caps)?;
    println!(
        "bounded search: West Mid = {} FT (within range: {})",
        resolution.optimized.optimized_value, resolution.optimized.within_range
    );
    if let Some(g) = &resolution.geometric {
        println!(
            "closure adjustment: West Mid = {} FT (adjustment {}, confidence {:?})",
            g.estimated_value, g.closure_adjustment, g.confidence
        );
    }

    let closed = analyze_edges_with_uncertainty(
        &edges(resolution.optimized.optimized_value),
        "FT",
        &mc,
        &cfg,
        &mut caps,
    )?;
    println!(
        "with West Mid = {}: closed = {}, perimeter {} FT, area {} sq FT",
        resolution.optimized.optimized_value,
        closed.closure.is_closed,
        closed.perimeter.best_estimate,
        closed.area.best_estimate
    );
    Ok(())
}
