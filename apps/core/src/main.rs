fn main() {
    if let Err(error) = powersearch_core::runtime::run() {
        eprintln!("[powersearch] {error:#}");
        std::process::exit(1);
    }
}
