use alloy::primitives::U256;

/// Format a smallest-unit amount (e.g. wei) into display units, rounded half-up
///
/// Returns `None` when the scaled value does not fit in 256 bits.
pub fn format_units_fixed(value: U256, decimals: u8, precision: usize) -> Option<String> {
    let scale = U256::from(10u64).checked_pow(U256::from(decimals))?;
    let precision_scale = U256::from(10u64).checked_pow(U256::from(precision))?;

    let half = scale / U256::from(2u64);
    let rounded = value
        .checked_mul(precision_scale)?
        .checked_add(half)?
        / scale;

    let whole = rounded / precision_scale;
    if precision == 0 {
        return Some(whole.to_string());
    }

    let fraction = rounded % precision_scale;
    Some(format!("{}.{:0>width$}", whole, fraction.to_string(), width = precision))
}

/// 주소 축약 표시 (앞 6자 ... 뒤 4자)
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// 토큰 수량 표시 형식
pub fn format_token_amount(amount: &str) -> String {
    let value = match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return "0".to_string(),
    };

    if value < 0.0001 {
        format!("{:.2e}", value)
    } else if value < 1.0 {
        format!("{:.6}", value)
    } else if value < 1_000.0 {
        format!("{:.4}", value)
    } else if value < 1_000_000.0 {
        format!("{:.2}", value)
    } else {
        let fixed = format!("{:.3}", value);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        group_thousands(trimmed)
    }
}

/// Format percentage (value already in percent)
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Format USD value
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(&fixed))
}

fn group_thousands(number: &str) -> String {
    let (integer, fraction) = match number.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (number, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{}.{}", grouped, fraction),
        None => grouped,
    }
}
