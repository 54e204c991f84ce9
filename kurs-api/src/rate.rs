use serde::{Deserialize, Deserializer};

/// A quoted rate as the backend sends and receives it
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiRate {
    pub currency_code: String,
    #[serde(deserialize_with = "decimal")]
    pub buy_rate: f64,
    #[serde(deserialize_with = "decimal")]
    pub sell_rate: f64,
}

/// One user's quoted rate for `currency`, relative to their base currency
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Rate {
    pub currency: String,
    pub buy: f64,
    pub sell: f64,
}

impl Rate {
    pub fn new(currency: impl Into<String>, buy: f64, sell: f64) -> Rate {
        Rate {
            currency: currency.into(),
            buy,
            sell,
        }
    }

    /// The implicit 1:1 self-rate of a base currency
    pub fn identity(currency: impl Into<String>) -> Rate {
        Rate::new(currency, 1., 1.)
    }

    /// A zero buy rate means the user has not filled this rate in yet
    pub fn is_set(&self) -> bool {
        self.buy != 0.
    }
}

impl From<ApiRate> for Rate {
    fn from(r: ApiRate) -> Rate {
        Rate {
            currency: r.currency_code,
            buy: r.buy_rate,
            sell: r.sell_rate,
        }
    }
}

impl From<Rate> for ApiRate {
    fn from(r: Rate) -> ApiRate {
        ApiRate {
            currency_code: r.currency,
            buy_rate: r.buy,
            sell_rate: r.sell,
        }
    }
}

// Decimal columns come back as strings ("0.9200") from some endpoints
fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }
    match Decimal::deserialize(d)? {
        Decimal::Number(n) => Ok(n),
        Decimal::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid decimal {s:?}"))),
    }
}
