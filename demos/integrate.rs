//! Search for an antiderivative from the command line.
//!
//! ```text
//! cargo run --example integrate -- 5 "4*x^3"
//! ```
//!
//! Set `RUST_LOG=antiderive=trace` to watch per-iteration bests.

use antiderive::Integrate;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let depth: usize = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(antiderive::DEFAULT_DEPTH);
    let expression = args.next().unwrap_or_else(|| "4*x^3".to_string());

    eprintln!("integrating {} at depth {}", expression, depth);
    match Integrate::new().depth(depth).run(&expression) {
        Ok(result) => println!("{}", result),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
