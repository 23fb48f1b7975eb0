use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

const TIMEZONE_CONFIG_FILE: &str = "daylist-time.toml";
const TIMEZONE_ENV_VAR: &str = "DAYLIST_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str = "DAYLIST_TIME_CONFIG";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
    timezone: Option<String>,
    time: Option<TimezoneSection>,
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
    timezone: Option<String>,
}

/// The one timezone that drives both DayKey derivation and the
/// Today/Tomorrow comparison. Resolution order: `DAYLIST_TIMEZONE`,
/// then `daylist-time.toml`, then UTC.
pub fn app_timezone() -> &'static Tz {
    static APP_TZ: OnceLock<Tz> = OnceLock::new();
    APP_TZ.get_or_init(resolve_app_timezone)
}

#[must_use]
pub fn today_in_app_tz(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(app_timezone()).date_naive()
}

fn resolve_app_timezone() -> Tz {
    if let Ok(raw) = std::env::var(TIMEZONE_ENV_VAR)
        && let Some(tz) = parse_timezone(&raw, TIMEZONE_ENV_VAR)
    {
        return tz;
    }

    if let Some(path) = timezone_config_path()
        && let Some(tz) = load_timezone_from_file(&path)
    {
        return tz;
    }

    chrono_tz::UTC
}

fn timezone_config_path() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var(TIMEZONE_CONFIG_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    std::env::current_dir()
        .ok()
        .map(|dir| dir.join(TIMEZONE_CONFIG_FILE))
}

fn load_timezone_from_file(path: &PathBuf) -> Option<Tz> {
    if !path.exists() {
        tracing::debug!(file = %path.display(), "timezone config file not found");
        return None;
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(
                file = %path.display(),
                error = %err,
                "failed reading timezone config file"
            );
            return None;
        }
    };

    let parsed = match toml::from_str::<TimezoneConfig>(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(
                file = %path.display(),
                error = %err,
                "failed parsing timezone config file"
            );
            return None;
        }
    };

    let timezone = parsed
        .timezone
        .or_else(|| parsed.time.and_then(|section| section.timezone));
    let Some(timezone) = timezone else {
        tracing::warn!(file = %path.display(), "timezone config had no timezone field");
        return None;
    };

    parse_timezone(timezone.as_str(), &format!("file:{}", path.display()))
}

fn parse_timezone(raw: &str, source: &str) -> Option<Tz> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::warn!(source, "timezone source was empty");
        return None;
    }

    match trimmed.parse::<Tz>() {
        Ok(tz) => {
            tracing::info!(source, timezone = %trimmed, "configured app timezone");
            Some(tz)
        }
        Err(err) => {
            tracing::error!(
                source,
                timezone = %trimmed,
                error = %err,
                "failed to parse timezone id"
            );
            None
        }
    }
}

/// Resolves a day expression against the given `today`. Accepted forms:
/// today/tomorrow/yesterday, weekday names (next occurrence), signed day
/// offsets (`+3d`, `-1d`), and `YYYY-MM-DD`.
#[tracing::instrument(fields(input = input))]
pub fn parse_day_expr(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => {
            return today
                .checked_add_signed(Duration::days(1))
                .ok_or_else(|| anyhow!("day out of range"));
        }
        "yesterday" => {
            return today
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(|| anyhow!("day out of range"));
        }
        _ => {}
    }

    if let Some(target_weekday) = parse_weekday_name(&lower) {
        return Ok(next_weekday_date(today, target_weekday));
    }

    let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)d$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

    if let Some(caps) = rel_re.captures(token) {
        let num: i64 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative number")?;
        let sign = caps
            .name("sign")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative sign"))?;

        let delta = if sign == "-" { -num } else { num };
        return today
            .checked_add_signed(Duration::days(delta))
            .ok_or_else(|| anyhow!("day offset out of range: {token}"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(date);
    }

    Err(anyhow!("unrecognized day expression: {input}")).with_context(|| {
        "supported forms: today/tomorrow/yesterday, weekday names (e.g. monday), \
         +Nd/-Nd, YYYY-MM-DD"
    })
}

fn parse_weekday_name(token: &str) -> Option<Weekday> {
    match token.trim() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_weekday_date(from: NaiveDate, target: Weekday) -> NaiveDate {
    let from_idx = from.weekday().num_days_from_monday() as i64;
    let target_idx = target.num_days_from_monday() as i64;
    let mut delta = (7 + target_idx - from_idx) % 7;
    if delta == 0 {
        delta = 7;
    }
    from.checked_add_signed(Duration::days(delta)).unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::parse_day_expr;

    fn today() -> NaiveDate {
        // a Tuesday
        NaiveDate::from_ymd_opt(2026, 2, 17).expect("valid date")
    }

    #[test]
    fn parses_relative_day_names() {
        assert_eq!(
            parse_day_expr("today", today()).expect("today").to_string(),
            "2026-02-17"
        );
        assert_eq!(
            parse_day_expr("Tomorrow", today()).expect("tomorrow").to_string(),
            "2026-02-18"
        );
        assert_eq!(
            parse_day_expr("yesterday", today()).expect("yesterday").to_string(),
            "2026-02-16"
        );
    }

    #[test]
    fn parses_weekday_names_as_next_occurrence() {
        assert_eq!(
            parse_day_expr("wednesday", today()).expect("wednesday").to_string(),
            "2026-02-18"
        );
        // the same weekday means a week out, not today
        assert_eq!(
            parse_day_expr("tue", today()).expect("tuesday").to_string(),
            "2026-02-24"
        );
    }

    #[test]
    fn parses_signed_day_offsets() {
        assert_eq!(
            parse_day_expr("+3d", today()).expect("+3d").to_string(),
            "2026-02-20"
        );
        assert_eq!(
            parse_day_expr("-1d", today()).expect("-1d").to_string(),
            "2026-02-16"
        );
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_day_expr("2024-06-01", today()).expect("iso date").to_string(),
            "2024-06-01"
        );
    }

    #[test]
    fn rejects_unknown_expressions() {
        assert!(parse_day_expr("someday", today()).is_err());
        assert!(parse_day_expr("+3h", today()).is_err());
    }
}
