//! Reads WKT geometries from the command line (or a built-in sample) and
//! prints their linearization, the WKB size and the measures of each.
//!
//! `RUST_LOG=curvature=trace cargo run --example linearize -- "CIRCULARSTRING (0 0, 1 1, 2 0)"`

use curvature::io::{read_wkt, to_wkt, wkb_size};
use curvature::Linearize;

const SAMPLE: &str = "CURVEPOLYGON (CIRCULARSTRING (0 4, 4 0, 8 4, 4 8, 0 4), CIRCULARSTRING (2 4, 4 2, 6 4, 4 6, 2 4))";

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("curvature=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    let inputs = if inputs.is_empty() { vec![SAMPLE.to_owned()] } else { inputs };

    for text in &inputs {
        match read_wkt(text) {
            Ok(geometry) => {
                let linear = geometry.flatten();
                println!("{}", to_wkt(&geometry));
                println!("  linearized: {linear}");
                println!(
                    "  length {:.6}  area {:.6}  wkb {} bytes",
                    geometry.length(),
                    geometry.area(),
                    wkb_size(&geometry, false)
                );
            }
            Err(e) => eprintln!("{text}: {e}"),
        }
    }
}
