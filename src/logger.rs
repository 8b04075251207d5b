// Console backend for the `log` facade.
use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Warnings and errors go to stderr so they stay visible when stdout is piped.
        match record.level() {
            Level::Error | Level::Warn => {
                eprintln!("[{}][{}] {}", record.level(), record.target(), record.args())
            }
            _ => println!("[{}][{}] {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Fails only if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    static LOGGER: ConsoleLogger = ConsoleLogger;
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Map the `-v` count from the command line to a level.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
