//! Ambient logging setup: a terminal logger driven by a `-v` repeat
//! count, the way CLI tools typically expose verbosity.

use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Map a repeated `-v` flag count to a `log` verbosity level.
///
/// `0` is the default (warnings and errors only, matching the aggregator's
/// own warn-and-skip policy); each additional `-v` widens the band by one
/// step, capping at `Trace`.
fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a terminal logger at the level implied by `verbosity`.
///
/// Failures here (e.g. a second call, or no usable terminal) are not
/// fatal to the CLI — they're reported to stderr directly, since the
/// logger itself isn't available yet to report them through.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    if let Err(err) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("failed to initialize logging: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_widens_the_level_monotonically() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }
}
