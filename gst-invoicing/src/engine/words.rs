//! Rupee amounts spelled out in the Indian numbering system.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

fn below_hundred(n: u64, out: &mut Vec<&'static str>) {
    let n = n as usize;
    if n < 20 {
        if n > 0 {
            out.push(ONES[n]);
        }
    } else {
        out.push(TENS[n / 10]);
        if n % 10 > 0 {
            out.push(ONES[n % 10]);
        }
    }
}

fn below_thousand(n: u64, out: &mut Vec<&'static str>) {
    if n >= 100 {
        out.push(ONES[(n / 100) as usize]);
        out.push("Hundred");
    }
    below_hundred(n % 100, out);
}

fn indian_words(n: u64, out: &mut Vec<&'static str>) {
    if n >= CRORE {
        indian_words(n / CRORE, out);
        out.push("Crore");
    }
    let lakhs = (n % CRORE) / LAKH;
    if lakhs > 0 {
        below_hundred(lakhs, out);
        out.push("Lakh");
    }
    let thousands = (n % LAKH) / THOUSAND;
    if thousands > 0 {
        below_hundred(thousands, out);
        out.push("Thousand");
    }
    below_thousand(n % THOUSAND, out);
}

/// Whole number in words; `0` is `"Zero"`.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut out = Vec::new();
    indian_words(n, &mut out);
    out.join(" ")
}

/// `"<rupees> Rupees[ and <paise> Paise] Only"`.
///
/// Negative or out-of-range amounts yield an empty string.
pub fn amount_in_words(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        return String::new();
    }

    let mut rupees = amount.trunc();
    let mut paise = ((amount - rupees) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if paise >= Decimal::ONE_HUNDRED {
        rupees += Decimal::ONE;
        paise = Decimal::ZERO;
    }

    let (Some(rupees), Some(paise)) = (rupees.to_u64(), paise.to_u64()) else {
        return String::new();
    };

    if paise == 0 {
        format!("{} Rupees Only", number_to_words(rupees))
    } else {
        format!(
            "{} Rupees and {} Paise Only",
            number_to_words(rupees),
            number_to_words(paise)
        )
    }
}

/// String-boundary variant: non-numeric input yields an empty string instead of an error.
pub fn amount_in_words_str(raw: &str) -> String {
    match Decimal::from_str(raw.trim()) {
        Ok(amount) => amount_in_words(amount),
        Err(_) => String::new(),
    }
}
