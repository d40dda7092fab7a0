use slog::{o, Drain, Logger};
use slog_term::{CompactFormat, TermDecorator};

pub use slog_async::Async;

/// Creates the root [`Logger`] of an application.
///
/// Records are written to the terminal in the compact format,
/// every record carries the `service` it was logged by.
pub fn new_logger(service: &'static str) -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = CompactFormat::new(decorator).build().fuse();
    let drain = Async::new(drain).build().fuse();

    Logger::root(drain, o!("service" => service))
}
