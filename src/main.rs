fn main() {
    if let Err(e) = galaxy_generator::core::Engine::run() {
        eprintln!("Galaxy generator failed: {}", e);
        std::process::exit(1);
    }
}
