//! Standardized CLI color policy.
//!
//! Same rules as most Rust tools:
//! - An explicit `--color always|never` wins.
//! - `NO_COLOR` disables colors.
//! - `EMACS` implies non-interactive output.
//! - In `Auto`, colors are only enabled when the target stream is a TTY.

use std::env;

/// When to emit ANSI colors.
///
/// Derives `clap::ValueEnum` so binaries can take it straight from `--color`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorWhen {
    /// Enable colors only when output is a TTY.
    #[default]
    Auto,

    /// Always enable colors.
    Always,

    /// Never enable colors.
    Never,
}

/// Environment variables that force colors off in `Auto` mode.
const COLOR_OPT_OUT_VARS: [&str; 2] = ["NO_COLOR", "EMACS"];

impl ColorWhen {
    // ---
    /// Returns whether ANSI color should be used for the given stream.
    pub fn should_color(self, stream: atty::Stream) -> bool {
        // ---
        self.resolve(|key| env::var_os(key).is_some(), || atty::is(stream))
    }

    /// Convenience helper for stdout.
    pub fn should_color_stdout(self) -> bool {
        self.should_color(atty::Stream::Stdout)
    }

    /// Convenience helper for stderr.
    pub fn should_color_stderr(self) -> bool {
        self.should_color(atty::Stream::Stderr)
    }

    /// Policy core, with the environment lookup and TTY probe injected.
    fn resolve(self, env_is_set: impl Fn(&str) -> bool, is_tty: impl FnOnce() -> bool) -> bool {
        match self {
            ColorWhen::Always => true,
            ColorWhen::Never => false,
            ColorWhen::Auto => {
                if COLOR_OPT_OUT_VARS.into_iter().any(&env_is_set) {
                    return false;
                }
                is_tty()
            }
        }
    }
}
