use std::sync::Arc;

use super::shared::IdGenerator;
use crate::error::AppError;
use domain::account::{AccountError, AccountRepository};
use domain::song::{Song, SongRepository};
use domain::value::SongId;
use log::error;

/// The only payload type accepted for upload.
pub const ACCEPTED_AUDIO_TYPE: &str = "audio/mpeg";

/// A parsed multipart upload as delivered by the HTTP layer.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct UploadSongCmd {
    /// Resolved request identity.
    pub username: String,
    /// Display name declared by the uploader.
    pub name: String,
    pub file: UploadedFile,
}

#[derive(Debug)]
pub struct UploadReceipt {
    pub song_id: SongId,
    pub filename: String,
}

#[derive(Debug)]
pub struct DeleteSongCmd {
    pub username: String,
    pub song_id: SongId,
}

pub struct SongService {
    song_repo: Arc<dyn SongRepository>,
    account_repo: Arc<dyn AccountRepository>,
    id_generator: Arc<dyn IdGenerator>,
}

impl SongService {
    pub fn new(
        song_repo: Arc<dyn SongRepository>,
        account_repo: Arc<dyn AccountRepository>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            song_repo,
            account_repo,
            id_generator,
        }
    }

    /// Upload admission: validates the payload, checks the uploader's quota,
    /// persists the song and counts it against the account.
    pub async fn upload(&self, cmd: UploadSongCmd) -> Result<UploadReceipt, AppError> {
        if cmd.name.trim().is_empty() {
            return Err(AppError::InvalidInput("missing file name".to_string()));
        }
        if cmd.file.data.is_empty() || cmd.file.size <= 0 {
            return Err(AppError::InvalidInput("missing file".to_string()));
        }
        let media_type = cmd
            .file
            .content_type
            .parse::<mime::Mime>()
            .map_err(|_| AppError::UnsupportedMediaType(cmd.file.content_type.clone()))?;
        if media_type.essence_str() != ACCEPTED_AUDIO_TYPE {
            return Err(AppError::UnsupportedMediaType(cmd.file.content_type.clone()));
        }

        let mut account = self
            .account_repo
            .find_by_username(&cmd.username)
            .await?
            .ok_or_else(|| {
                AppError::AggregateNotFound("Account".to_string(), cmd.username.clone())
            })?;

        // Quota check and counter increment are one aggregate transition; a
        // refusal leaves the account untouched.
        account.admit_upload().map_err(|e| match e {
            AccountError::QuotaExceeded => AppError::QuotaExceeded,
            other => AppError::from(other),
        })?;

        let id = SongId::from(self.id_generator.next_id().await?);
        let song = Song::new(
            id.clone(),
            &cmd.name,
            &cmd.file.filename,
            cmd.file.size,
            cmd.file.data,
            &cmd.username,
        );
        self.song_repo.create(&song).await?;

        // The version-guarded save persists the counter and serializes
        // concurrent uploads from the same account. If it fails, the row just
        // written would be an orphan: compensate by deleting it.
        if let Err(e) = self.account_repo.save(&account).await {
            error!(
                "counter update for '{}' failed after song insert, compensating: {}",
                cmd.username, e
            );
            if let Err(del) = self.song_repo.delete(&id).await {
                // The counter really is off by one now; keep a loud trace.
                error!("compensating delete of song {} failed: {}", id, del);
            }
            return Err(AppError::from(e));
        }

        Ok(UploadReceipt {
            song_id: id,
            filename: song.filename,
        })
    }

    /// Deletes a song after re-checking ownership at the data layer, then
    /// gives the owner's quota slot back. Returns the deleted song's name.
    pub async fn delete(&self, cmd: DeleteSongCmd) -> Result<String, AppError> {
        let song = self
            .song_repo
            .find_by_id(&cmd.song_id)
            .await?
            .ok_or_else(|| {
                AppError::AggregateNotFound("Song".to_string(), cmd.song_id.to_string())
            })?;
        if song.owner != cmd.username {
            return Err(AppError::Forbidden(
                "only the owner may delete a song".to_string(),
            ));
        }
        if !self.song_repo.delete(&cmd.song_id).await? {
            return Err(AppError::AggregateNotFound(
                "Song".to_string(),
                cmd.song_id.to_string(),
            ));
        }

        // Liked-song references in other accounts stay as they are: a
        // dangling like is a valid state that renders through the name
        // sentinel, not a corruption to clean up.
        let mut account = self
            .account_repo
            .find_by_username(&song.owner)
            .await?
            .ok_or_else(|| {
                AppError::UnknownError(format!(
                    "owner account '{}' missing for song {}",
                    song.owner, cmd.song_id
                ))
            })?;
        account.release_upload();
        self.account_repo.save(&account).await?;
        Ok(song.name)
    }
}
