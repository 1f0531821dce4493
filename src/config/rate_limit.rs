use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: RateLimitRule::new(5, 10),
            protected: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Some(rule) = parse_rule_env("RATE_LIMIT_AUTH") {
            cfg.auth = rule;
        }
        if let Some(rule) = parse_rule_env("RATE_LIMIT_PROTECTED") {
            cfg.protected = rule;
        }

        cfg
    }
}

fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Rule format: "per_second:burst", e.g. "5:10".
fn parse_rule_env(var_name: &str) -> Option<RateLimitRule> {
    let raw = env::var(var_name).ok()?;
    match parse_rule(&raw) {
        Ok(rule) => Some(rule),
        Err(err) => {
            tracing::warn!("Invalid {} '{}': {}", var_name, raw, err);
            None
        }
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 {
        return Err("per_second must be > 0".to_string());
    }
    if burst_size == 0 {
        return Err("burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_rule() {
        assert_eq!(parse_rule("12:24").unwrap(), RateLimitRule::new(12, 24));
    }

    #[test]
    fn parse_rule_rejects_zero() {
        assert!(parse_rule("0:10").is_err());
        assert!(parse_rule("10:0").is_err());
    }

    #[test]
    fn parse_rule_rejects_garbage() {
        assert!(parse_rule("abc").is_err());
        assert!(parse_rule("a:b").is_err());
    }
}
