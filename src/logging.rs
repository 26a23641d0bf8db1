use log::LevelFilter;

/// Map `-v` / `-q` counts onto a level, starting from `warn`.
pub fn level_from_flags(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::Off,
        -1 => LevelFilter::Error,
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install `env_logger` with `default` as the filter; `RUST_LOG` still wins.
pub fn init(default: LevelFilter) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default.as_str().to_ascii_lowercase()),
    )
    .format_timestamp(None)
    .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_shift_the_default_level() {
        assert_eq!(level_from_flags(0, 0), LevelFilter::Warn);
        assert_eq!(level_from_flags(1, 0), LevelFilter::Info);
        assert_eq!(level_from_flags(2, 0), LevelFilter::Debug);
        assert_eq!(level_from_flags(5, 0), LevelFilter::Trace);
        assert_eq!(level_from_flags(0, 1), LevelFilter::Error);
        assert_eq!(level_from_flags(1, 3), LevelFilter::Off);
    }
}
