use std::sync::Arc;

use crate::error::AppError;
use domain::account::AccountRepository;
use domain::value::SongId;

#[derive(Debug)]
pub struct ToggleLikedCmd {
    /// Resolved request identity.
    pub username: String,
    pub song_id: SongId,
    /// Desired membership. The HTTP layer guarantees this was explicitly
    /// present in the request; `false` is a value, not an absence.
    pub liked: bool,
}

#[derive(Debug)]
pub struct ToggleSubscriptionCmd {
    pub username: String,
    pub subscribed: bool,
}

/// 账户应用服务
///
/// Entitlement transitions on a single account: liked-set membership and the
/// premium flag. Both persist the aggregate in one row update, so a storage
/// failure leaves no partial mutation behind.
pub struct AccountService {
    account_repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(account_repo: Arc<dyn AccountRepository>) -> Self {
        Self { account_repo }
    }

    /// Sets whether the account likes a song and returns the resulting
    /// membership. Repeat calls with the same desired state are no-ops.
    pub async fn toggle_liked(&self, cmd: ToggleLikedCmd) -> Result<bool, AppError> {
        let mut account = self
            .account_repo
            .find_by_username(&cmd.username)
            .await?
            .ok_or_else(|| {
                AppError::AggregateNotFound("Account".to_string(), cmd.username.clone())
            })?;
        let member = account.set_liked(cmd.song_id, cmd.liked);
        self.account_repo.save(&account).await?;
        Ok(member)
    }

    /// Sets the premium flag and returns the persisted value. Downgrading
    /// never re-checks the quota — owned songs are grandfathered.
    pub async fn toggle_subscription(
        &self,
        cmd: ToggleSubscriptionCmd,
    ) -> Result<bool, AppError> {
        let mut account = self
            .account_repo
            .find_by_username(&cmd.username)
            .await?
            .ok_or_else(|| {
                AppError::AggregateNotFound("Account".to_string(), cmd.username.clone())
            })?;
        let flag = account.set_subscription(cmd.subscribed);
        self.account_repo.save(&account).await?;
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::InMemoryAccounts;
    use domain::account::Account;
    use domain::value::AccountId;

    fn setup() -> (Arc<InMemoryAccounts>, AccountService) {
        let accounts = Arc::new(InMemoryAccounts::default());
        accounts.insert(Account::new(AccountId::from(1), "kara", "hash"));
        let svc = AccountService::new(accounts.clone());
        (accounts, svc)
    }

    fn like(liked: bool) -> ToggleLikedCmd {
        ToggleLikedCmd {
            username: "kara".to_string(),
            song_id: SongId::from(7),
            liked,
        }
    }

    #[tokio::test]
    async fn liking_twice_equals_liking_once() {
        let (accounts, svc) = setup();
        assert!(svc.toggle_liked(like(true)).await.unwrap());
        assert!(svc.toggle_liked(like(true)).await.unwrap());
        assert_eq!(accounts.get("kara").liked_songs.len(), 1);
    }

    #[tokio::test]
    async fn like_then_unlike_restores_the_set() {
        let (accounts, svc) = setup();
        svc.toggle_liked(like(true)).await.unwrap();
        assert!(!svc.toggle_liked(like(false)).await.unwrap());
        assert!(accounts.get("kara").liked_songs.is_empty());
    }

    #[tokio::test]
    async fn unliking_a_never_liked_song_is_a_successful_noop() {
        let (accounts, svc) = setup();
        assert!(!svc.toggle_liked(like(false)).await.unwrap());
        assert!(accounts.get("kara").liked_songs.is_empty());
    }

    #[tokio::test]
    async fn failed_save_leaves_the_like_set_unchanged() {
        let (accounts, svc) = setup();
        svc.toggle_liked(like(true)).await.unwrap();
        accounts.fail_next_save();
        assert!(svc.toggle_liked(like(false)).await.is_err());
        // the stored aggregate still holds the like
        assert_eq!(accounts.get("kara").liked_songs.len(), 1);
    }

    #[tokio::test]
    async fn subscription_toggle_persists_and_returns_the_flag() {
        let (accounts, svc) = setup();
        let cmd = |subscribed| ToggleSubscriptionCmd {
            username: "kara".to_string(),
            subscribed,
        };
        assert!(svc.toggle_subscription(cmd(true)).await.unwrap());
        assert!(accounts.get("kara").premium_subscription);
        assert!(!svc.toggle_subscription(cmd(false)).await.unwrap());
        assert!(!accounts.get("kara").premium_subscription);
    }
}
