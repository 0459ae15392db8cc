use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Console verbosity, ordered from least to most output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Our own crate follows the verbosity; the HTTP stack stays at warn
    /// unless tracing everything.
    fn directives(self) -> String {
        let level = self.level();
        let http = if self == Self::Trace { level } else { Level::WARN };
        format!("gallery_manifest={level},ureq={http}")
    }

    pub fn shows_summary(self) -> bool {
        self > Self::Quiet
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// command-line verbosity.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbosity >= Verbosity::Debug)
        .with_line_number(verbosity >= Verbosity::Debug)
        .compact();

    match verbosity {
        Verbosity::Quiet | Verbosity::Normal => subscriber.without_time().init(),
        _ => subscriber.init(),
    }
}
