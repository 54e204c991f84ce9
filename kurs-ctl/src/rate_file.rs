use std::path::PathBuf;

use async_trait::async_trait;
use kurs_api::{ApiRate, Error, RateApi};

/// Rate listing stored as a JSON array, standing in for the backend
pub struct RateFile {
    path: PathBuf,
}

impl RateFile {
    pub fn new(path: impl Into<PathBuf>) -> RateFile {
        RateFile { path: path.into() }
    }

    fn read(&self) -> Result<Vec<ApiRate>, Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Unknown(format!("reading {:?}: {e}", self.path)))?;
        serde_json::from_str(&data)
            .map_err(|e| Error::InvalidInput(format!("parsing {:?}: {e}", self.path)))
    }

    fn write(&self, rates: &[ApiRate]) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(rates)
            .map_err(|e| Error::Unknown(format!("serializing rates: {e}")))?;
        std::fs::write(&self.path, data)
            .map_err(|e| Error::Unknown(format!("writing {:?}: {e}", self.path)))
    }
}

#[async_trait]
impl RateApi for RateFile {
    async fn fetch_rates(&mut self) -> Result<Vec<ApiRate>, Error> {
        self.read()
    }

    async fn save_rate(&mut self, rate: ApiRate) -> Result<ApiRate, Error> {
        if rate.currency_code.trim().is_empty() {
            return Err(Error::InvalidInput(String::from("currency code is required")));
        }
        if !(rate.buy_rate >= 0. && rate.sell_rate >= 0.) {
            return Err(Error::InvalidInput(String::from(
                "rates must be non-negative numbers",
            )));
        }
        let mut rates = self.read()?;
        match rates
            .iter_mut()
            .find(|r| r.currency_code == rate.currency_code)
        {
            Some(r) => *r = rate.clone(),
            None => rates.push(rate.clone()),
        }
        self.write(&rates)?;
        Ok(rate)
    }

    async fn delete_rate(&mut self, currency_code: &str) -> Result<(), Error> {
        let mut rates = self.read()?;
        let before = rates.len();
        rates.retain(|r| r.currency_code != currency_code);
        if rates.len() == before {
            return Err(Error::rate_not_found(currency_code));
        }
        self.write(&rates)
    }

    async fn clear_rates(&mut self) -> Result<(), Error> {
        self.write(&[])
    }
}
