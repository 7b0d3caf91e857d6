use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::{info, warn};

use crate::planner::PlannerConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub planner: PlannerSettings,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            planner: PlannerSettings::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        let host_value =
            env_string("LOAD_PLANNER_API_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse LOAD_PLANNER_API_HOST ('{}'): {}. Using {}.",
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string("LOAD_PLANNER_API_PORT") {
            Some(raw) => parse_port(&raw).unwrap_or(Self::DEFAULT_PORT),
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Configuration for the placement engine and the limits the service puts on it.
#[derive(Clone, Debug)]
pub struct PlannerSettings {
    planner: PlannerConfig,
    max_units: u64,
}

impl PlannerSettings {
    pub const DEFAULT_MAX_UNITS: u64 = 10_000;
    pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(30);

    const GENERAL_EPSILON_VAR: &'static str = "LOAD_PLANNER_GENERAL_EPSILON";
    const SUPPORT_RATIO_VAR: &'static str = "LOAD_PLANNER_SUPPORT_RATIO";
    const ALLOW_ROTATION_VAR: &'static str = "LOAD_PLANNER_ALLOW_ROTATIONS";
    const TIME_BUDGET_VAR: &'static str = "LOAD_PLANNER_TIME_BUDGET_MS";
    const DEFAULT_COLOR_VAR: &'static str = "LOAD_PLANNER_DEFAULT_COLOR";
    const MAX_UNITS_VAR: &'static str = "LOAD_PLANNER_MAX_UNITS";

    fn from_env() -> Self {
        let general_epsilon = load_f64_with_warning(
            Self::GENERAL_EPSILON_VAR,
            PlannerConfig::DEFAULT_GENERAL_EPSILON,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted tolerances may let boxes touch where they should not",
        );

        let support_ratio = load_f64_with_warning(
            Self::SUPPORT_RATIO_VAR,
            PlannerConfig::DEFAULT_SUPPORT_RATIO,
            |value| (0.0..=1.0).contains(&value),
            "must be between 0 and 1",
            "Support check enabled, fewer stacked placements are possible",
        );

        let allow_rotations = env_string(Self::ALLOW_ROTATION_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_ROTATION_VAR))
            .unwrap_or(PlannerConfig::DEFAULT_ALLOW_ROTATIONS);

        let time_budget = env_string(Self::TIME_BUDGET_VAR)
            .and_then(|raw| parse_time_budget(&raw, Self::TIME_BUDGET_VAR))
            .unwrap_or(Self::DEFAULT_TIME_BUDGET);

        let max_units = env_string(Self::MAX_UNITS_VAR)
            .and_then(|raw| parse_max_units(&raw, Self::MAX_UNITS_VAR))
            .unwrap_or(Self::DEFAULT_MAX_UNITS);

        let default_color = env_string(Self::DEFAULT_COLOR_VAR)
            .unwrap_or_else(|| PlannerConfig::DEFAULT_COLOR.to_string());

        let planner = PlannerConfig::builder()
            .general_epsilon(general_epsilon)
            .support_ratio(support_ratio)
            .allow_rotations(allow_rotations)
            .time_budget(Some(time_budget))
            .default_color(default_color)
            .build();

        Self { planner, max_units }
    }

    /// Returns the configured PlannerConfig.
    pub fn planner_config(&self) -> PlannerConfig {
        self.planner.clone()
    }

    /// Largest number of units a single request may expand to.
    pub fn max_units(&self) -> u64 {
        self.max_units
    }
}

impl From<PlannerConfig> for PlannerSettings {
    fn from(planner: PlannerConfig) -> Self {
        Self {
            planner,
            max_units: Self::DEFAULT_MAX_UNITS,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            warn!("⚠️ LOAD_PLANNER_API_PORT must not be 0. Using default port.");
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "⚠️ Could not parse LOAD_PLANNER_API_PORT ('{}'): {}. Using default port.",
                raw, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_time_budget(raw: &str, var_name: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!("⚠️ {} must be greater than 0. Using the default time budget.", var_name);
            None
        }
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as milliseconds: {}. Using the default time budget.",
                var_name, raw, err
            );
            None
        }
    }
}

fn parse_max_units(raw: &str, var_name: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!("⚠️ {} must be greater than 0. Using the default limit.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}'): {}. Using the default limit.",
                var_name, raw, err
            );
            None
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_setting(&raw, var_name, default, validator, invalid_hint, notice),
        None => default,
    }
}

fn parse_f64_setting(
    raw: &str,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if !validator(value) => {
            warn!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Ok(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                info!("⚠️ {} ({} = {}).", notice, var_name, value);
            }
            value
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_true_values() {
        for raw in ["1", "true", "yes", "y", "on", "TRUE", "Yes", " true ", "  1  "] {
            assert_eq!(parse_bool(raw, "TEST_VAR"), Some(true), "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_bool_false_values() {
        for raw in ["0", "false", "no", "n", "off", "FALSE", "No", " false "] {
            assert_eq!(parse_bool(raw, "TEST_VAR"), Some(false), "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_bool_invalid_values() {
        assert_eq!(parse_bool("invalid", "TEST_VAR"), None);
        assert_eq!(parse_bool("2", "TEST_VAR"), None);
        assert_eq!(parse_bool("", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("3000"), Some(3000));
        assert_eq!(parse_port(" 8081 "), Some(8081));
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("abc"), None);
    }

    #[test]
    fn test_parse_time_budget() {
        assert_eq!(
            parse_time_budget("250", "TEST_VAR"),
            Some(Duration::from_millis(250))
        );
        assert_eq!(parse_time_budget("0", "TEST_VAR"), None);
        assert_eq!(parse_time_budget("-5", "TEST_VAR"), None);
        assert_eq!(parse_time_budget("soon", "TEST_VAR"), None);
    }

    #[test]
    fn test_parse_max_units() {
        assert_eq!(parse_max_units("500", "TEST_VAR"), Some(500));
        assert_eq!(parse_max_units(" 20000 ", "TEST_VAR"), Some(20_000));
        assert_eq!(parse_max_units("0", "TEST_VAR"), None);
        assert_eq!(parse_max_units("-3", "TEST_VAR"), None);
        assert_eq!(parse_max_units("many", "TEST_VAR"), None);
    }

    #[test]
    fn test_settings_from_planner_config_use_default_limit() {
        let settings = PlannerSettings::from(PlannerConfig::default());
        assert_eq!(settings.max_units(), PlannerSettings::DEFAULT_MAX_UNITS);
        assert_eq!(settings.planner_config().time_budget, None);
    }

    #[test]
    fn test_parse_f64_setting_falls_back_on_invalid_values() {
        let positive = |value: f64| value > 0.0;
        assert_eq!(
            parse_f64_setting("0.5", "TEST_VAR", 1.0, positive, "must be > 0", "changed"),
            0.5
        );
        assert_eq!(
            parse_f64_setting("-1", "TEST_VAR", 1.0, positive, "must be > 0", "changed"),
            1.0
        );
        assert_eq!(
            parse_f64_setting("abc", "TEST_VAR", 1.0, positive, "must be > 0", "changed"),
            1.0
        );
    }
}
