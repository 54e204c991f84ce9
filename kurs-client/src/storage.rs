use std::collections::HashMap;

use anyhow::{anyhow, Context};

/// String key-value persistence, as offered by browser local storage
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

pub fn load_json<S, T>(store: &S, key: &str) -> anyhow::Result<Option<T>>
where
    S: KvStore + ?Sized,
    T: for<'de> serde::Deserialize<'de>,
{
    match store.get(key)? {
        None => Ok(None),
        Some(s) => Ok(Some(
            serde_json::from_str(&s).with_context(|| format!("parsing stored value {key:?}"))?,
        )),
    }
}

pub fn save_json<S, T>(store: &mut S, key: &str, value: &T) -> anyhow::Result<()>
where
    S: KvStore + ?Sized,
    T: serde::Serialize,
{
    let s = serde_json::to_string(value).with_context(|| format!("serializing {key:?}"))?;
    store.set(key, s)
}

#[derive(Clone, Debug, Default)]
pub struct MemStore {
    values: HashMap<String, String>,
    failing: bool,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    /// While failing, every operation errors out as if storage was unavailable
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Reads a value even while failing
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s as &str)
    }

    fn check(&self) -> anyhow::Result<()> {
        match self.failing {
            true => Err(anyhow!("storage is unavailable")),
            false => Ok(()),
        }
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.check()?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.check()?;
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use anyhow::anyhow;
    use gloo_storage::{LocalStorage, Storage};

    use super::KvStore;

    /// The browser's `window.localStorage`
    #[derive(Clone, Copy, Debug, Default)]
    pub struct LocalStore;

    impl KvStore for LocalStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            LocalStorage::raw()
                .get_item(key)
                .map_err(|e| anyhow!("reading {key:?} from local storage: {e:?}"))
        }

        fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
            LocalStorage::raw()
                .set_item(key, &value)
                .map_err(|e| anyhow!("writing {key:?} to local storage: {e:?}"))
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            LocalStorage::delete(key);
            Ok(())
        }
    }
}
