/// Initializes the logger with the `env_logger` crate.
pub fn init_logger() {
    env_logger::init();
}
