//! School-grade (`ano`) derivation from free-text labels.

use std::sync::OnceLock;

use regex::Regex;

/// Grade used when the label carries no usable number.
pub const FALLBACK_GRADE: u8 = 1;

static DIGITS: OnceLock<Regex> = OnceLock::new();

fn digits() -> &'static Regex {
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("valid digit pattern"))
}

/// Parse a grade label such as `"3º Ano"` into `1..=max`.
///
/// The first digit run in the label wins. Labels without digits yield
/// [`FALLBACK_GRADE`]; values outside the range are clamped.
pub fn parse_grade(label: &str, max: u8) -> u8 {
    let max = max.max(FALLBACK_GRADE);
    let Some(found) = digits().find(label) else {
        return FALLBACK_GRADE;
    };
    // A digit run too long for u32 is still "above max".
    let value = found.as_str().parse::<u32>().unwrap_or(u32::MAX);
    value.clamp(u32::from(FALLBACK_GRADE), u32::from(max)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_label_yields_its_number() {
        assert_eq!(parse_grade("3º Ano", 5), 3);
        assert_eq!(parse_grade("  1o ano", 9), 1);
    }

    #[test]
    fn label_without_digits_falls_back_to_first_grade() {
        assert_eq!(parse_grade("Terceiro ano", 9), 1);
        assert_eq!(parse_grade("", 5), 1);
    }

    #[test]
    fn grade_above_max_is_clamped() {
        assert_eq!(parse_grade("12º Ano", 9), 9);
        assert_eq!(parse_grade("7º Ano", 5), 5);
        assert_eq!(parse_grade("99999999999999º", 9), 9);
    }

    #[test]
    fn zero_is_raised_to_first_grade() {
        assert_eq!(parse_grade("0º Ano", 5), 1);
    }

    #[test]
    fn first_digit_run_wins() {
        assert_eq!(parse_grade("Ano 4 (turma 2)", 9), 4);
    }

    #[test]
    fn zero_max_behaves_like_one() {
        assert_eq!(parse_grade("3º Ano", 0), 1);
    }
}
