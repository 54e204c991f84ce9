use futures::channel::mpsc::UnboundedSender;

use crate::{
    api::{ApiRate, Error, Rate, RateApi},
    notice::Notices,
    storage::KvStore,
    Converter, Notice, RateTable,
};

/// A user's exchange profile: the rates they quote, and the converter that
/// follows them
pub struct ExchangeProfile<A, S> {
    api: A,
    converter: Converter<S>,
    notices: Notices,
}

impl<A: RateApi, S: KvStore> ExchangeProfile<A, S> {
    /// Restores the converter rows from `storage`; they get synced to the
    /// rates on the first successful `load_rates`
    pub fn new(api: A, base: impl Into<String>, storage: S) -> ExchangeProfile<A, S> {
        ExchangeProfile {
            api,
            converter: Converter::load(storage, RateTable::new(base)),
            notices: Notices::default(),
        }
    }

    pub fn with_notices(mut self, sender: UnboundedSender<Notice>) -> ExchangeProfile<A, S> {
        self.notices = Notices::new(sender);
        self
    }

    pub fn rates(&self) -> &RateTable {
        self.converter.rates()
    }

    pub fn converter(&self) -> &Converter<S> {
        &self.converter
    }

    pub fn converter_mut(&mut self) -> &mut Converter<S> {
        &mut self.converter
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub async fn load_rates(&mut self) -> Result<(), Error> {
        let rates = match self.api.fetch_rates().await {
            Ok(rates) => rates,
            Err(err) => return Err(self.failed(err)),
        };
        tracing::debug!(num = rates.len(), "fetched rates");
        let table = RateTable::from_api(self.rates().base(), rates);
        self.converter.replace_rates(table);
        Ok(())
    }

    /// Creates or replaces the rate quoted for `rate.currency`
    pub async fn save_rate(&mut self, rate: Rate) -> Result<(), Error> {
        let saved = match self.api.save_rate(ApiRate::from(rate)).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.failed(err)),
        };
        let mut table = self.rates().clone();
        table.upsert(Rate::from(saved));
        self.converter.replace_rates(table);
        self.notices.success("Rate saved");
        Ok(())
    }

    pub async fn delete_rate(&mut self, currency: &str) -> Result<(), Error> {
        if let Err(err) = self.api.delete_rate(currency).await {
            return Err(self.failed(err));
        }
        let mut table = self.rates().clone();
        table.remove(currency);
        self.converter.replace_rates(table);
        self.notices.success("Rate deleted");
        Ok(())
    }

    pub async fn clear_rates(&mut self) -> Result<(), Error> {
        if let Err(err) = self.api.clear_rates().await {
            return Err(self.failed(err));
        }
        let mut table = self.rates().clone();
        table.clear();
        self.converter.replace_rates(table);
        self.notices.success("Rates cleared");
        Ok(())
    }

    fn failed(&self, err: Error) -> Error {
        tracing::info!(%err, "rate request failed");
        self.notices.error(&err);
        err
    }
}
