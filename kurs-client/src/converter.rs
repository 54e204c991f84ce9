use std::collections::HashSet;

use crate::{
    compute_conversion,
    storage::{load_json, save_json, KvStore},
    Amount, ConversionRow, Mode, RateTable,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Side {
    From,
    To,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterState {
    pub convert: Vec<ConversionRow>,
    pub find_out: Vec<ConversionRow>,
}

impl ConverterState {
    pub fn rows(&self, mode: Mode) -> &[ConversionRow] {
        match mode {
            Mode::Convert => &self.convert,
            Mode::FindOut => &self.find_out,
        }
    }

    fn rows_mut(&mut self, mode: Mode) -> &mut Vec<ConversionRow> {
        match mode {
            Mode::Convert => &mut self.convert,
            Mode::FindOut => &mut self.find_out,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConverterAction {
    AddRow {
        mode: Mode,
    },
    RemoveRow {
        mode: Mode,
        index: usize,
    },
    ResetRow {
        mode: Mode,
        index: usize,
    },
    UpdateValue {
        mode: Mode,
        index: usize,
        value: Amount,
    },
    UpdateCurrency {
        mode: Mode,
        index: usize,
        side: Side,
        currency: String,
    },
    /// Re-sync one mode against the currencies of the current rate table
    SyncCurrencies {
        mode: Mode,
    },
}

fn default_rows() -> Vec<ConversionRow> {
    vec![ConversionRow::default()]
}

/// The converter tool: one row list per mode, kept in sync with a rate table
/// and persisted after every change
pub struct Converter<S> {
    state: ConverterState,
    rates: RateTable,
    storage: S,
}

impl<S: KvStore> Converter<S> {
    /// Hydrates both row lists from `storage`, without syncing them to `rates`
    pub fn load(storage: S, rates: RateTable) -> Converter<S> {
        let state = ConverterState {
            convert: load_rows(&storage, Mode::Convert, default_rows()),
            find_out: load_rows(&storage, Mode::FindOut, default_rows()),
        };
        Converter {
            state,
            rates,
            storage,
        }
    }

    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    pub fn rows(&self, mode: Mode) -> &[ConversionRow] {
        self.state.rows(mode)
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn apply(&mut self, action: ConverterAction) {
        match action {
            ConverterAction::AddRow { mode } => self.add_row(mode),
            ConverterAction::RemoveRow { mode, index } => self.remove_row(mode, index),
            ConverterAction::ResetRow { mode, index } => self.reset_row(mode, index),
            ConverterAction::UpdateValue { mode, index, value } => {
                self.update_value(mode, index, value)
            }
            ConverterAction::UpdateCurrency {
                mode,
                index,
                side,
                currency,
            } => self.update_currency(mode, index, side, currency),
            ConverterAction::SyncCurrencies { mode } => {
                let codes = self.rates.available_codes();
                self.sync_with_available_currencies(mode, &codes)
            }
        }
    }

    pub fn add_row(&mut self, mode: Mode) {
        self.state.rows_mut(mode).push(ConversionRow::default());
        self.persist(mode);
    }

    pub fn remove_row(&mut self, mode: Mode, index: usize) {
        let rows = self.state.rows_mut(mode);
        if index >= rows.len() {
            tracing::debug!(?mode, index, "ignoring removal of out-of-range row");
            return;
        }
        rows.remove(index);
        self.persist(mode);
    }

    pub fn reset_row(&mut self, mode: Mode, index: usize) {
        self.edit_row(mode, index, |row| *row.driving_value_mut(mode) = Amount::zero());
    }

    pub fn update_value(&mut self, mode: Mode, index: usize, value: Amount) {
        self.edit_row(mode, index, |row| *row.driving_value_mut(mode) = value);
    }

    /// Picking the currency already on the other side swaps the two sides
    pub fn update_currency(&mut self, mode: Mode, index: usize, side: Side, currency: String) {
        self.edit_row(mode, index, |row| {
            let (this, other) = match side {
                Side::From => (&mut row.from_currency, &mut row.to_currency),
                Side::To => (&mut row.to_currency, &mut row.from_currency),
            };
            if *other == currency {
                *other = std::mem::replace(this, currency);
            } else {
                *this = currency;
            }
        });
    }

    /// Drops the rows referencing a currency outside of `codes`, leaving at
    /// least one empty row
    pub fn sync_with_available_currencies(&mut self, mode: Mode, codes: &HashSet<String>) {
        let rows = self.state.rows_mut(mode);
        let before = rows.len();
        rows.retain(|r| codes.contains(&r.from_currency) && codes.contains(&r.to_currency));
        if before != rows.len() {
            tracing::debug!(
                ?mode,
                dropped = before - rows.len(),
                "dropped rows with unavailable currencies"
            );
        }
        if rows.is_empty() {
            rows.push(ConversionRow::default());
        }
        self.persist(mode);
    }

    /// Switches to a new rate table, re-syncing and recomputing every row of
    /// both modes
    pub fn replace_rates(&mut self, rates: RateTable) {
        self.rates = rates;
        let codes = self.rates.available_codes();
        let with_base = self.rates.with_base();
        for mode in Mode::ALL {
            self.sync_with_available_currencies(mode, &codes);
            for row in self.state.rows_mut(mode).iter_mut() {
                *row = compute_conversion(row, mode, &with_base);
            }
            self.persist(mode);
        }
    }

    fn edit_row(&mut self, mode: Mode, index: usize, f: impl FnOnce(&mut ConversionRow)) {
        let rates = self.rates.with_base();
        let row = match self.state.rows_mut(mode).get_mut(index) {
            Some(row) => row,
            None => {
                tracing::debug!(?mode, index, "ignoring edit of out-of-range row");
                return;
            }
        };
        f(row);
        *row = compute_conversion(row, mode, &rates);
        self.persist(mode);
    }

    fn persist(&mut self, mode: Mode) {
        let complete = self
            .state
            .rows(mode)
            .iter()
            .filter(|r| r.is_complete())
            .collect::<Vec<_>>();
        if let Err(err) = save_json(&mut self.storage, mode.storage_key(), &complete) {
            tracing::warn!(?err, ?mode, "failed persisting converter rows");
        }
    }
}

/// Reads the persisted rows of `mode`, or `default` if there are none
pub fn load_rows<S: KvStore + ?Sized>(
    storage: &S,
    mode: Mode,
    default: Vec<ConversionRow>,
) -> Vec<ConversionRow> {
    match load_json(storage, mode.storage_key()) {
        Ok(Some(rows)) => rows,
        Ok(None) => default,
        Err(err) => {
            tracing::warn!(?err, ?mode, "failed loading converter rows, using defaults");
            default
        }
    }
}
