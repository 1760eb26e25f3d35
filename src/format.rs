use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::domain::Locale;

pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

// Above MAX_SAFE_INTEGER every locale gets `,` grouping of the exact digits.
pub fn format_count(value: &BigUint, locale: Locale) -> String {
    match value.to_u64().filter(|v| *v <= MAX_SAFE_INTEGER) {
        Some(small) => format_locale(small, locale),
        None => group_digits(&value.to_str_radix(10), ","),
    }
}

fn format_locale(value: u64, locale: Locale) -> String {
    let digits = value.to_string();
    match locale {
        Locale::En => group_digits(&digits, ","),
        // CLDR minimum grouping digits is 2 for Spanish: 1234 stays ungrouped.
        Locale::Es if digits.len() <= 4 => digits,
        Locale::Es => group_digits(&digits, "."),
        Locale::Ar => group_digits(&digits, "٬")
            .chars()
            .map(|ch| match ch.to_digit(10) {
                Some(d) => ARABIC_INDIC_DIGITS[d as usize],
                None => ch,
            })
            .collect(),
    }
}

pub fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + (len / 3) * separator.len());
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}
