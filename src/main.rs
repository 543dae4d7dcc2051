fn main() {
    if let Err(err) = estate_trends::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
