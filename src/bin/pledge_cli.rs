use std::{env, process};

use pledge_core::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli(env::args().skip(1).collect()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
