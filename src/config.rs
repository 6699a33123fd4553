use log::{debug, warn};

use crate::fit::Fit;

/// Environment variable naming the fit policy of the process-wide heap.
pub const FIT_VAR: &str = "FREELIST_FIT";
/// Environment variable enabling the exit statistics report.
pub const STATS_VAR: &str = "FREELIST_STATS";

/// Construction-time knobs for a heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
  pub fit: Fit,
  /// Print the statistics report when the process exits.
  pub report_on_exit: bool,
}

impl Config {
  /// Defaults overridden by [`FIT_VAR`] and [`STATS_VAR`].
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Same as [`from_env`](Config::from_env) with an injectable lookup.
  /// Unparseable values are logged and ignored.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let mut config = Self::default();

    if let Some(value) = lookup(FIT_VAR) {
      match value.parse() {
        Ok(fit) => config.fit = fit,
        Err(err) => warn!("ignoring {FIT_VAR}: {err}"),
      }
    }

    if let Some(value) = lookup(STATS_VAR) {
      match parse_flag(&value) {
        Some(flag) => config.report_on_exit = flag,
        None => warn!("ignoring {STATS_VAR}: expected a boolean, got `{value}`"),
      }
    }

    debug!("heap config: fit={}, report_on_exit={}", config.fit, config.report_on_exit);
    config
  }
}

fn parse_flag(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" | "" => Some(false),
    _ => None,
  }
}
