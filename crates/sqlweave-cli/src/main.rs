fn main() {
    if let Err(e) = sqlweave_cli::run(std::env::args().collect()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
