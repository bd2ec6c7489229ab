/// Render an amount as Chilean pesos: `$13.510`, `-$990`.
///
/// Display only. Rounds to whole pesos, half away from zero; non-finite
/// amounts render as `$0`.
pub fn format_clp(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_clp(13510.0), "$13.510");
        assert_eq!(format_clp(1_234_567.0), "$1.234.567");
        assert_eq!(format_clp(990.0), "$990");
        assert_eq!(format_clp(0.0), "$0");
    }

    #[test]
    fn rounds_to_whole_pesos() {
        assert_eq!(format_clp(1520.4), "$1.520");
        assert_eq!(format_clp(1520.5), "$1.521");
        assert_eq!(format_clp(-0.4), "$0");
    }

    #[test]
    fn negatives_and_non_finite() {
        assert_eq!(format_clp(-3990.0), "-$3.990");
        assert_eq!(format_clp(f64::NAN), "$0");
        assert_eq!(format_clp(f64::INFINITY), "$0");
    }
}
