fn main() {
    if let Err(err) = schema_sniff::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
