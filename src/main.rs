//! Embedding test harness CLI entry point

fn main() {
    // Logging is initialized inside cli::run() because the default filter
    // level depends on the --debug flag.
    embed_harness::cli::run();
}
