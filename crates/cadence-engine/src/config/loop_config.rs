use std::time::Duration;

use crate::error::ConfigError;

/// Fixed update frequency used when nothing else is configured.
pub const DEFAULT_FIXED_FREQUENCY_HZ: f64 = 75.0;

const ENV_FIXED_HZ: &str = "CADENCE_FIXED_HZ";
const ENV_DRIFT: &str = "CADENCE_DRIFT";

/// Time between ticks at `hz`.
///
/// Fails for non-finite and non-positive rates, and for rates so low that the
/// period does not fit in a `Duration`.
pub fn period_for(hz: f64) -> Result<Duration, ConfigError> {
    if hz.is_nan() || hz.is_infinite() {
        return Err(ConfigError::NonFiniteFrequency(hz));
    }
    if hz <= 0.0 {
        return Err(ConfigError::NonPositiveFrequency(hz));
    }
    Duration::try_from_secs_f64(1.0 / hz).map_err(|_| ConfigError::PeriodOutOfRange(hz))
}

/// How the fixed-rate thread sleeps between ticks.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DriftPolicy {
    /// Sleep `max(0, period - time spent in the callback)`.
    #[default]
    Compensate,
    /// Sleep a full period after every tick. Callback time is not subtracted,
    /// so the effective rate drops below the configured one under load.
    Coarse,
}

impl DriftPolicy {
    /// Sleep duration after a tick that took `spent`.
    pub fn sleep_for(self, period: Duration, spent: Duration) -> Duration {
        match self {
            DriftPolicy::Compensate => period.saturating_sub(spent),
            DriftPolicy::Coarse => period,
        }
    }
}

/// Fixed-rate timeline configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoopConfig {
    /// Fixed updates per second. Must be finite and positive.
    pub fixed_frequency_hz: f64,
    pub drift: DriftPolicy,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_frequency_hz: DEFAULT_FIXED_FREQUENCY_HZ,
            drift: DriftPolicy::default(),
        }
    }
}

impl LoopConfig {
    pub fn with_frequency(fixed_frequency_hz: f64) -> Self {
        Self {
            fixed_frequency_hz,
            ..Self::default()
        }
    }

    pub fn drift(mut self, drift: DriftPolicy) -> Self {
        self.drift = drift;
        self
    }

    /// Rejects frequencies without a representable period. Values are never coerced.
    pub fn validate(&self) -> Result<(), ConfigError> {
        period_for(self.fixed_frequency_hz).map(|_| ())
    }

    /// Delta passed to every fixed-update callback, in seconds.
    pub fn fixed_delta(&self) -> f32 {
        (1.0 / self.fixed_frequency_hz) as f32
    }

    /// Nominal time between fixed ticks.
    ///
    /// Only meaningful for a validated config; saturates otherwise.
    pub fn period(&self) -> Duration {
        period_for(self.fixed_frequency_hz).unwrap_or(Duration::MAX)
    }

    /// Defaults overridden by `CADENCE_FIXED_HZ` and `CADENCE_DRIFT`.
    ///
    /// The result is validated; a malformed variable is an error rather than
    /// a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_FIXED_HZ) {
            cfg.fixed_frequency_hz = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_FIXED_HZ,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(ENV_DRIFT) {
            cfg.drift = match raw.trim().to_ascii_lowercase().as_str() {
                "compensate" => DriftPolicy::Compensate,
                "coarse" => DriftPolicy::Coarse,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_DRIFT,
                        value: raw,
                    });
                }
            };
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    // ── validate ──────────────────────────────────────────────────────────

    #[test]
    fn default_is_valid_75hz() {
        let cfg = LoopConfig::default();
        assert_eq!(cfg.fixed_frequency_hz, 75.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_frequency_rejected() {
        assert_eq!(
            LoopConfig::with_frequency(0.0).validate(),
            Err(ConfigError::NonPositiveFrequency(0.0))
        );
    }

    #[test]
    fn negative_frequency_rejected() {
        assert_eq!(
            LoopConfig::with_frequency(-30.0).validate(),
            Err(ConfigError::NonPositiveFrequency(-30.0))
        );
    }

    #[test]
    fn non_finite_frequency_rejected() {
        assert!(matches!(
            LoopConfig::with_frequency(f64::NAN).validate(),
            Err(ConfigError::NonFiniteFrequency(_))
        ));
        assert!(matches!(
            LoopConfig::with_frequency(f64::INFINITY).validate(),
            Err(ConfigError::NonFiniteFrequency(_))
        ));
    }

    #[test]
    fn frequency_with_unrepresentable_period_rejected() {
        let cfg = LoopConfig::with_frequency(1e-300);
        assert_eq!(cfg.validate(), Err(ConfigError::PeriodOutOfRange(1e-300)));
        assert_eq!(cfg.period(), Duration::MAX);
    }

    #[test]
    fn very_high_frequency_is_accepted() {
        let cfg = LoopConfig::with_frequency(1e300);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.period(), Duration::ZERO);
    }

    // ── derived timing ────────────────────────────────────────────────────

    #[test]
    fn period_and_delta_match_frequency() {
        let cfg = LoopConfig::with_frequency(50.0);
        assert!((cfg.period().as_secs_f64() - 0.02).abs() < 1e-8);
        assert!((cfg.fixed_delta() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn compensate_subtracts_callback_time() {
        let period = Duration::from_millis(20);
        assert_eq!(
            DriftPolicy::Compensate.sleep_for(period, Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        // Overrun never produces a negative sleep.
        assert_eq!(
            DriftPolicy::Compensate.sleep_for(period, Duration::from_millis(35)),
            Duration::ZERO
        );
    }

    #[test]
    fn coarse_always_sleeps_full_period() {
        let period = Duration::from_millis(20);
        assert_eq!(DriftPolicy::Coarse.sleep_for(period, Duration::from_millis(35)), period);
    }

    // ── from_env ──────────────────────────────────────────────────────────

    #[test]
    fn env_overrides_frequency_and_drift() {
        let cfg = LoopConfig::from_lookup(env(&[
            ("CADENCE_FIXED_HZ", " 120 "),
            ("CADENCE_DRIFT", "Coarse"),
        ]))
        .unwrap();
        assert_eq!(cfg.fixed_frequency_hz, 120.0);
        assert_eq!(cfg.drift, DriftPolicy::Coarse);
    }

    #[test]
    fn env_absent_keeps_defaults() {
        assert_eq!(LoopConfig::from_lookup(env(&[])).unwrap(), LoopConfig::default());
    }

    #[test]
    fn env_garbage_frequency_is_error() {
        let err = LoopConfig::from_lookup(env(&[("CADENCE_FIXED_HZ", "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "CADENCE_FIXED_HZ", .. }));
    }

    #[test]
    fn env_zero_frequency_is_not_coerced() {
        let err = LoopConfig::from_lookup(env(&[("CADENCE_FIXED_HZ", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveFrequency(0.0));
    }

    #[test]
    fn env_unknown_drift_is_error() {
        let err = LoopConfig::from_lookup(env(&[("CADENCE_DRIFT", "sometimes")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "CADENCE_DRIFT", .. }));
    }
}
