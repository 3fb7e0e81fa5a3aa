use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Level for the given number of `-v` flags, unless `CMS_LOG` names one.
pub fn level_for(verbosity: u8, env_level: Option<&str>) -> Level {
    if let Some(level) = env_level.and_then(|raw| raw.trim().parse::<Level>().ok()) {
        return level;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the stderr subscriber. Later calls are no-ops.
pub fn init_logging(level: Level) {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0, None), Level::WARN);
        assert_eq!(level_for(1, None), Level::INFO);
        assert_eq!(level_for(2, None), Level::DEBUG);
        assert_eq!(level_for(5, None), Level::TRACE);
    }

    #[test]
    fn test_env_level_wins() {
        assert_eq!(level_for(0, Some("debug")), Level::DEBUG);
        assert_eq!(level_for(3, Some("error")), Level::ERROR);
        assert_eq!(level_for(1, Some("nonsense")), Level::INFO);
    }
}
