use super::dto::{AccountSummary, SongFile, SongSummary};
use super::QueryError;
use async_trait::async_trait;

#[async_trait]
pub trait SongDao: Send + Sync {
    /// Up to `limit` random songs for the landing page.
    async fn random_songs(&self, limit: u64) -> Result<Vec<SongSummary>, QueryError>;
    /// Case-insensitive substring containment over display names.
    async fn search_by_name(&self, needle: &str) -> Result<Vec<SongSummary>, QueryError>;
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<SongSummary>, QueryError>;
    /// Name lookup sentinel: `None` for a deleted or unknown id, never an
    /// error. Dangling liked-song references render through this.
    async fn song_name(&self, id: i64) -> Result<Option<String>, QueryError>;
    async fn song_file(&self, id: i64) -> Result<Option<SongFile>, QueryError>;
}

#[async_trait]
pub trait AccountDao: Send + Sync {
    /// Case-insensitive substring containment over usernames.
    async fn search_by_username(&self, needle: &str)
        -> Result<Vec<AccountSummary>, QueryError>;
    /// `None` when the account itself cannot be resolved.
    async fn liked_song_ids(&self, username: &str) -> Result<Option<Vec<i64>>, QueryError>;
    async fn premium_flag(&self, username: &str) -> Result<Option<bool>, QueryError>;
}
