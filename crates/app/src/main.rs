//! Headless Micropolis-style city engine driven over JSON on stdin/stdout.
//!
//! Usage: `micropolis [--seed N]`

mod headless;

fn main() {
    let mut seed = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => match args.next().map(|s| s.parse::<u64>()) {
                Some(Ok(n)) => seed = Some(n),
                _ => {
                    eprintln!("--seed needs a number");
                    std::process::exit(2);
                }
            },
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }
    headless::run(seed.unwrap_or_else(simulation::random_seed));
}
