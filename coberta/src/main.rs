use std::io::{stdin, stdout};
use std::process;

fn main() {
    let mut input = stdin().lock();
    let mut output = stdout().lock();
    if let Err(err) = coberta::run::convert(&mut input, &mut output) {
        eprintln!("coberta: {err}");
        process::exit(1);
    }
}
