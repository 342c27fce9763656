fn main() {
    if let Err(err) = csv_inspect::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
