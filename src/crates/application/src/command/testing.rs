//! In-memory repository fakes for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use crate::command::shared::IdGenerator;
use crate::command::song::{UploadSongCmd, UploadedFile};
use crate::error::AppError;
use async_trait::async_trait;
use domain::account::{Account, AccountError, AccountRepository};
use domain::song::{Song, SongError, SongRepository};
use domain::value::SongId;

#[derive(Default)]
pub(crate) struct InMemoryAccounts {
    accounts: Mutex<HashMap<String, Account>>,
    fail_next_save: AtomicBool,
}

impl InMemoryAccounts {
    pub fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.username.clone(), account);
    }

    pub fn get(&self, username: &str) -> Account {
        self.accounts
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .expect("account seeded")
    }

    pub fn update(&self, username: &str, f: impl FnOnce(&mut Account)) {
        let mut map = self.accounts.lock().unwrap();
        f(map.get_mut(username).expect("account seeded"));
    }

    /// Makes the next save fail with a storage error, then recover.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.lock().unwrap().get(username).cloned())
    }

    async fn save<'a>(&'a self, agg: &Account) -> Result<(), AccountError> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(AccountError::DbErr("injected save failure".to_string()));
        }
        let mut stored = agg.clone();
        stored.version += 1;
        self.accounts
            .lock()
            .unwrap()
            .insert(agg.username.clone(), stored);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemorySongs {
    songs: Mutex<HashMap<i64, Song>>,
}

impl InMemorySongs {
    pub fn len(&self) -> usize {
        self.songs.lock().unwrap().len()
    }
}

#[async_trait]
impl SongRepository for InMemorySongs {
    async fn create<'a>(&'a self, song: &Song) -> Result<(), SongError> {
        self.songs
            .lock()
            .unwrap()
            .insert(song.id.as_i64(), song.clone());
        Ok(())
    }

    async fn find_by_id<'a>(&'a self, id: &SongId) -> Result<Option<Song>, SongError> {
        Ok(self.songs.lock().unwrap().get(&id.as_i64()).cloned())
    }

    async fn delete<'a>(&'a self, id: &SongId) -> Result<bool, SongError> {
        Ok(self.songs.lock().unwrap().remove(&id.as_i64()).is_some())
    }
}

pub(crate) struct SeqIdGenerator(AtomicI64);

impl Default for SeqIdGenerator {
    fn default() -> Self {
        Self(AtomicI64::new(100))
    }
}

#[async_trait]
impl IdGenerator for SeqIdGenerator {
    async fn next_id(&self) -> Result<i64, AppError> {
        Ok(self.0.fetch_add(1, Ordering::SeqCst))
    }
}

pub(crate) fn mp3_upload(username: &str, name: &str) -> UploadSongCmd {
    UploadSongCmd {
        username: username.to_string(),
        name: name.to_string(),
        file: UploadedFile {
            filename: "track.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            size: 3,
            data: vec![0xff, 0xfb, 0x90],
        },
    }
}
