use crate::api::Rate;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Mode {
    /// The amount to sell is entered, the amount received is derived
    #[serde(rename = "convert")]
    Convert,

    /// The amount to receive is entered, the amount to sell is derived
    #[serde(rename = "findOut")]
    FindOut,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Convert, Mode::FindOut];

    pub fn storage_key(&self) -> &'static str {
        match self {
            Mode::Convert => "converter-rows-convert",
            Mode::FindOut => "converter-rows-find-out",
        }
    }
}

/// A row value: a raw number while the user is typing, a formatted string
/// once derived or blurred
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn zero() -> Amount {
        Amount::Number(0.)
    }

    fn undefined() -> Amount {
        Amount::Text(String::new())
    }

    fn formatted(v: f64) -> Amount {
        Amount::Text(format!("{:.2}", v))
    }

    /// Numeric value of this amount, reading the longest numeric prefix of text
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => parse_float_prefix(s)?,
        };
        v.is_finite().then_some(v)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Amount::Text(s) => Some(s),
            Amount::Number(_) => None,
        }
    }
}

impl Default for Amount {
    fn default() -> Amount {
        Amount::zero()
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Amount {
        Amount::Number(v)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Amount {
        Amount::Text(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Amount {
        Amount::Text(s)
    }
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut num_digits = int_end - end;
    end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        num_digits += frac_end - end - 1;
        end = frac_end;
    }
    if num_digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRow {
    pub from_currency: String,
    pub to_currency: String,
    pub from_value: Amount,
    pub to_value: Amount,
}

impl ConversionRow {
    pub fn new(from_currency: &str, to_currency: &str) -> ConversionRow {
        ConversionRow {
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            ..ConversionRow::default()
        }
    }

    /// Both currencies are picked
    pub fn is_complete(&self) -> bool {
        !self.from_currency.is_empty() && !self.to_currency.is_empty()
    }

    pub fn driving_value_mut(&mut self, mode: Mode) -> &mut Amount {
        match mode {
            Mode::Convert => &mut self.from_value,
            Mode::FindOut => &mut self.to_value,
        }
    }

    pub fn derived_value(&self, mode: Mode) -> &Amount {
        match mode {
            Mode::Convert => &self.to_value,
            Mode::FindOut => &self.from_value,
        }
    }
}

fn find_rate<'a>(rates: &'a [Rate], currency: &str) -> Option<&'a Rate> {
    rates.iter().find(|r| r.currency == currency)
}

/// Recompute the derived value of `row` from its driving value.
///
/// `rates` must contain the base currency's 1:1 rate. Rows with a currency
/// missing from `rates` are returned unchanged; a zero rate on either side
/// makes the derived value the empty string.
pub fn compute_conversion(row: &ConversionRow, mode: Mode, rates: &[Rate]) -> ConversionRow {
    let mut res = row.clone();
    let (from, to) = match (
        find_rate(rates, &row.from_currency),
        find_rate(rates, &row.to_currency),
    ) {
        (Some(from), Some(to)) => (from, to),
        _ => return res,
    };
    if from.buy == 0. || to.sell == 0. {
        match mode {
            Mode::Convert => res.to_value = Amount::undefined(),
            Mode::FindOut => res.from_value = Amount::undefined(),
        }
        return res;
    }
    match mode {
        Mode::Convert => {
            res.to_value = match row.from_value.value() {
                Some(v) if v > 0. => Amount::formatted(v * from.buy / to.sell),
                _ => Amount::formatted(0.),
            }
        }
        Mode::FindOut => {
            res.from_value = match row.to_value.value() {
                Some(v) if v > 0. => Amount::formatted(v * to.sell / from.buy),
                _ => Amount::formatted(0.),
            }
        }
    }
    res
}
