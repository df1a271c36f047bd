use chrono::NaiveDateTime;

/// Song listing row. Carries metadata only; the payload is fetched through
/// [`super::dao::SongDao::song_file`] when a client actually plays a song.
#[derive(Debug, Clone)]
pub struct SongSummary {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub size: i64,
    pub created_at: NaiveDateTime,
}

/// The raw stored artifact, ready to be streamed back.
#[derive(Debug, Clone)]
pub struct SongFile {
    pub filename: String,
    pub size: i64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub username: String,
    pub premium_subscription: bool,
}
