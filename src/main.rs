fn main() {
    if let Err(e) = toxiflora_lib::run() {
        tracing::error!(error = %e, "Pipeline failed");
        std::process::exit(1);
    }
}
