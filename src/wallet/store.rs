use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{WALLETS_KEY, Wallet};
use crate::error::{ConsoleError, Result};

/// Wallet store shared between the console handlers and background tasks.
pub type SharedWallets = Arc<Mutex<WalletStore>>;

/// Minimal string key/value persistence, the local-storage of this process.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// Keyed blobs kept in a single JSON object file.
/// Every write rewrites the whole file through a temp file + rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("{} is not a valid store file ({e}); starting empty", path.display());
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("cannot read {} ({e}); starting empty", path.display());
                HashMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
        self.entries.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// The locally remembered wallets, written back in full on every change.
pub struct WalletStore {
    storage: Box<dyn KeyValueStore>,
    wallets: Vec<Wallet>,
}

impl WalletStore {
    /// Restore the wallet list. Absent or malformed data yields an empty list.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let wallets = match storage.get(WALLETS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Wallet>>(&raw).unwrap_or_else(|e| {
                warn!("stored wallet list is malformed ({e}); starting with no wallets");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("cannot read stored wallets ({e}); starting with no wallets");
                Vec::new()
            }
        };
        info!("loaded {} wallet(s)", wallets.len());
        Self { storage, wallets }
    }

    pub fn shared(self) -> SharedWallets {
        Arc::new(Mutex::new(self))
    }

    /// Append a ledger-confirmed wallet and persist before returning.
    pub fn add(&mut self, wallet: Wallet) -> Result<()> {
        if self.contains(&wallet.address) {
            return Err(ConsoleError::DuplicateWallet(wallet.address));
        }
        self.wallets.push(wallet);
        if let Err(e) = self.persist() {
            self.wallets.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove every entry with `address` and persist. Returns how many went.
    pub fn remove(&mut self, address: &str) -> Result<usize> {
        let before = self.wallets.clone();
        self.wallets.retain(|w| w.address != address);
        let removed = before.len() - self.wallets.len();
        if let Err(e) = self.persist() {
            self.wallets = before;
            return Err(e);
        }
        debug!("removed {removed} wallet(s) for {address}");
        Ok(removed)
    }

    pub fn all(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn get(&self, address: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.address == address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.get(address).is_some()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.wallets.iter().map(|w| w.address.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Wipe the persisted blob and the in-memory list.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.wallets.clear();
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.wallets)?;
        self.storage.set(WALLETS_KEY, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage that can be told to fail writes, sharing its entries with the test.
    #[derive(Clone, Default)]
    struct FlakyStore {
        entries: Arc<Mutex<HashMap<String, String>>>,
        fail_writes: Arc<Mutex<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> io::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: String) -> io::Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(io::Error::other("disk full"));
            }
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        fn clear(&mut self) -> io::Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn load_starts_empty_without_data() {
        let store = WalletStore::load(Box::new(MemoryStore::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn load_degrades_on_malformed_data() {
        let storage = MemoryStore::with_entry(WALLETS_KEY, "{not json");
        let store = WalletStore::load(Box::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn created_wallet_is_the_only_entry() {
        let mut store = WalletStore::load(Box::new(MemoryStore::new()));
        store.add(Wallet::new("A1", "pub1")).unwrap();
        assert_eq!(store.all(), &[Wallet::new("A1", "pub1")]);
    }

    #[test]
    fn duplicate_address_is_rejected() {
        let mut store = WalletStore::load(Box::new(MemoryStore::new()));
        store.add(Wallet::new("A1", "pub1")).unwrap();
        let err = store.add(Wallet::new("A1", "other")).unwrap_err();
        assert!(matches!(err, ConsoleError::DuplicateWallet(ref a) if a == "A1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A1").unwrap().public_key, "pub1");
    }

    #[test]
    fn reload_reproduces_list_after_mixed_mutations() {
        let shared = FlakyStore::default();
        let mut store = WalletStore::load(Box::new(shared.clone()));
        for (addr, key) in [("A1", "p1"), ("B2", "p2"), ("C3", "p3"), ("D4", "p4")] {
            store.add(Wallet::new(addr, key)).unwrap();
        }
        assert_eq!(store.remove("B2").unwrap(), 1);
        assert_eq!(store.remove("missing").unwrap(), 0);
        store.add(Wallet::new("E5", "p5")).unwrap();

        let reloaded = WalletStore::load(Box::new(shared));
        assert_eq!(reloaded.all(), store.all());
        assert_eq!(reloaded.addresses(), vec!["A1", "C3", "D4", "E5"]);
    }

    #[test]
    fn failed_write_rolls_back() {
        let shared = FlakyStore::default();
        let mut store = WalletStore::load(Box::new(shared.clone()));
        store.add(Wallet::new("A1", "p1")).unwrap();

        *shared.fail_writes.lock().unwrap() = true;
        assert!(matches!(store.add(Wallet::new("B2", "p2")), Err(ConsoleError::Storage(_))));
        assert!(store.remove("A1").is_err());
        assert_eq!(store.addresses(), vec!["A1"]);
    }

    #[test]
    fn file_store_survives_reopen_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        let mut store = WalletStore::load(Box::new(FileStore::open(&path)));
        store.add(Wallet::new("A1", "pub1")).unwrap();
        store.add(Wallet::new("B2", "pub2")).unwrap();

        let mut reopened = WalletStore::load(Box::new(FileStore::open(&path)));
        assert_eq!(reopened.addresses(), vec!["A1", "B2"]);

        reopened.reset().unwrap();
        assert!(reopened.is_empty());
        assert!(!path.exists());
        assert!(WalletStore::load(Box::new(FileStore::open(&path))).is_empty());
    }

    #[test]
    fn failed_file_removal_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let mut storage = FileStore::open(&path);
        storage.set(WALLETS_KEY, "[]".to_string()).unwrap();

        // a directory in place of the file makes the unlink fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(storage.clear().is_err());
        assert_eq!(storage.get(WALLETS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, "garbage").unwrap();
        let store = WalletStore::load(Box::new(FileStore::open(&path)));
        assert!(store.is_empty());
    }
}
