//! Shared plumbing for the command-line front ends.

use std::io;

use clap::ValueEnum;
use delve_core::Theme;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Classic,
    Horror,
    Magical,
    Mechanical,
    Natural,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Classic => Theme::Classic,
            ThemeArg::Horror => Theme::Horror,
            ThemeArg::Magical => Theme::Magical,
            ThemeArg::Mechanical => Theme::Mechanical,
            ThemeArg::Natural => Theme::Natural,
        }
    }
}

pub const ALL_THEMES: [Theme; 5] =
    [Theme::Classic, Theme::Horror, Theme::Magical, Theme::Mechanical, Theme::Natural];
