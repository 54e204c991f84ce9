use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use kurs_client::storage::KvStore;

/// Key-value storage kept as a single JSON object on disk
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }

    fn read(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {:?}", self.path))?;
        serde_json::from_str(&data).with_context(|| format!("parsing state file {:?}", self.path))
    }

    fn write(&self, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(values).context("serializing state")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing state file {:?}", self.path))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        let mut values = self.read()?;
        values.insert(key.to_string(), value);
        self.write(&values)
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let mut values = self.read()?;
        if values.remove(key).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kurs_client::{api::Rate, Amount, Converter, Mode, RateTable, Side};

    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut s = FileStore::new(&path);
        assert_eq!(s.get("a").unwrap(), None);
        s.set("a", String::from("1")).unwrap();
        s.set("b", String::from("2")).unwrap();
        s.remove("a").unwrap();
        s.remove("missing").unwrap();

        let s = FileStore::new(&path);
        assert_eq!(s.get("a").unwrap(), None);
        assert_eq!(s.get("b").unwrap(), Some(String::from("2")));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        let s = FileStore::new(file.path());
        assert!(s.get("a").is_err());
    }

    #[test]
    fn converter_rows_are_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut rates = RateTable::new("USD");
        rates.upsert(Rate::new("EUR", 0.9, 0.92));

        let mut c = Converter::load(FileStore::new(&path), rates.clone());
        c.update_currency(Mode::Convert, 0, Side::From, String::from("USD"));
        c.update_currency(Mode::Convert, 0, Side::To, String::from("EUR"));
        c.update_value(Mode::Convert, 0, Amount::Number(100.));

        let c = Converter::load(FileStore::new(&path), rates);
        assert_eq!(c.rows(Mode::Convert)[0].to_value, Amount::from("108.70"));
    }
}
