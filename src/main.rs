fn main() {
    if let Err(e) = carepulse_lib::run() {
        eprintln!("carepulse: {e}");
        std::process::exit(1);
    }
}
