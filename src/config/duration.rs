use std::time::Duration;

/// Parse a duration such as `24h`, `1h30m`, `1.5h`, `90s` or `250ms`.
///
/// Accepts one or more `<number><unit>` terms with units `h`, `m`, `s`
/// and `ms`. A bare `0` is allowed. Signs are not.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration is empty".into());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let is_numeric = |c: char| c.is_ascii_digit() || c == '.';
    let mut total_ms = 0f64;
    let mut rest = s;

    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_numeric(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration '{s}': expected a number"));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration '{s}': bad number '{}'", &rest[..number_len]))?;
        rest = &rest[number_len..];

        let unit_len = rest.find(is_numeric).unwrap_or(rest.len());
        let millis_per_unit = match &rest[..unit_len] {
            "h" => 3_600_000.0,
            "m" => 60_000.0,
            "s" => 1_000.0,
            "ms" => 1.0,
            "" => return Err(format!("invalid duration '{s}': missing unit")),
            unit => {
                return Err(format!(
                    "invalid duration '{s}': unknown unit '{unit}' (use h, m, s or ms)"
                ));
            }
        };
        rest = &rest[unit_len..];

        total_ms += value * millis_per_unit;
    }

    if !total_ms.is_finite() || total_ms >= u64::MAX as f64 {
        return Err(format!("invalid duration '{s}': too large"));
    }

    Ok(Duration::from_millis(total_ms.round() as u64))
}
