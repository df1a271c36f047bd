use std::sync::Arc;

use crate::command::shared::IdGenerator;
use crate::error::AppError;
use domain::account::{Account, AccountError, AccountRepository};
use domain::value::AccountId;

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AppError>;
    fn verify(&self, pwd: &str, hashed_pwd: &str) -> Result<(), AppError>;
}

/// Claims carried by an issued token. This is also the request identity the
/// HTTP layer hands to the services — identity is always an explicit
/// parameter, never ambient state read from inside a handler.
#[derive(Debug, Clone)]
pub struct UserClaims {
    pub username: String,
}

impl From<&Account> for UserClaims {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
        }
    }
}

pub trait TokenService: Send + Sync {
    fn issue(&self, claims: &UserClaims) -> Result<String, AppError>;
    fn verify(&self, token: &str) -> Result<UserClaims, AppError>;
}

#[derive(Clone)]
pub struct AuthService {
    account_repo: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    token_svc: Arc<dyn TokenService>,
    id_generator: Arc<dyn IdGenerator>,
}

impl AuthService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        token_svc: Arc<dyn TokenService>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            account_repo,
            hasher,
            token_svc,
            id_generator,
        }
    }

    /// Registers a new account and returns a login token.
    pub async fn signup(
        &self,
        username: &str,
        pass: &str,
        pass2: &str,
    ) -> Result<String, AppError> {
        if username.is_empty() || pass.is_empty() || pass2.is_empty() {
            return Err(AppError::InvalidInput("all fields are required".to_string()));
        }
        if pass != pass2 {
            return Err(AppError::InvalidInput("passwords do not match".to_string()));
        }
        if self
            .account_repo
            .find_by_username(username)
            .await?
            .is_some()
        {
            return Err(AccountError::UsernameTaken(username.to_string()).into());
        }

        let hashed_pwd = self.hasher.hash(pass)?;
        let id = AccountId::from(self.id_generator.next_id().await?);
        let account = Account::new(id, username, &hashed_pwd);
        self.account_repo.save(&account).await?;
        self.token_svc.issue(&UserClaims::from(&account))
    }

    /// Login with username and password, returns a JWT token
    pub async fn login(&self, username: &str, pwd: &str) -> Result<String, AppError> {
        let account = self
            .account_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::AuthError("wrong username or password".to_string()))?;
        self.hasher
            .verify(pwd, &account.password)
            .map_err(|_| AppError::AuthError("wrong username or password".to_string()))?;
        self.token_svc.issue(&UserClaims::from(&account))
    }

    /// Re-authenticates with the old password, stores the new hash and
    /// returns a fresh token.
    pub async fn change_password(
        &self,
        username: &str,
        old_pwd: &str,
        new_pwd: &str,
    ) -> Result<String, AppError> {
        if old_pwd.is_empty() || new_pwd.is_empty() {
            return Err(AppError::InvalidInput(
                "missing old or new password".to_string(),
            ));
        }
        let mut account = self
            .account_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::AuthError("wrong password".to_string()))?;
        self.hasher
            .verify(old_pwd, &account.password)
            .map_err(|_| AppError::AuthError("wrong password".to_string()))?;

        let hashed_pwd = self.hasher.hash(new_pwd)?;
        account.change_password(&hashed_pwd);
        self.account_repo.save(&account).await?;
        self.token_svc.issue(&UserClaims::from(&account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{InMemoryAccounts, SeqIdGenerator};

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plain: &str) -> Result<String, AppError> {
            Ok(format!("hashed:{}", plain))
        }

        fn verify(&self, pwd: &str, hashed_pwd: &str) -> Result<(), AppError> {
            if hashed_pwd == format!("hashed:{}", pwd) {
                Ok(())
            } else {
                Err(AppError::AuthError("invalid password".to_string()))
            }
        }
    }

    struct StaticTokens;

    impl TokenService for StaticTokens {
        fn issue(&self, claims: &UserClaims) -> Result<String, AppError> {
            Ok(format!("token:{}", claims.username))
        }

        fn verify(&self, token: &str) -> Result<UserClaims, AppError> {
            token
                .strip_prefix("token:")
                .map(|u| UserClaims {
                    username: u.to_string(),
                })
                .ok_or_else(|| AppError::AuthError("bad token".to_string()))
        }
    }

    fn service(accounts: &Arc<InMemoryAccounts>) -> AuthService {
        AuthService::new(
            accounts.clone(),
            Arc::new(PlainHasher),
            Arc::new(StaticTokens),
            Arc::new(SeqIdGenerator::default()),
        )
    }

    #[tokio::test]
    async fn signup_creates_an_account_and_issues_a_token() {
        let accounts = Arc::new(InMemoryAccounts::default());
        let token = service(&accounts).signup("kara", "pw", "pw").await.unwrap();
        assert_eq!(token, "token:kara");
        let stored = accounts.get("kara");
        assert!(!stored.premium_subscription);
        assert_eq!(stored.num_owned_songs, 0);
        assert!(stored.liked_songs.is_empty());
    }

    #[tokio::test]
    async fn signup_rejects_mismatched_or_missing_fields() {
        let accounts = Arc::new(InMemoryAccounts::default());
        let svc = service(&accounts);
        assert!(matches!(
            svc.signup("kara", "pw", "other").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.signup("", "pw", "pw").await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn signup_rejects_a_taken_username() {
        let accounts = Arc::new(InMemoryAccounts::default());
        let svc = service(&accounts);
        svc.signup("kara", "pw", "pw").await.unwrap();
        assert!(matches!(
            svc.signup("kara", "pw2", "pw2").await,
            Err(AppError::AccountError(AccountError::UsernameTaken(_)))
        ));
    }

    #[tokio::test]
    async fn login_rejects_a_wrong_password() {
        let accounts = Arc::new(InMemoryAccounts::default());
        let svc = service(&accounts);
        svc.signup("kara", "pw", "pw").await.unwrap();
        assert!(matches!(
            svc.login("kara", "nope").await,
            Err(AppError::AuthError(_))
        ));
        assert_eq!(svc.login("kara", "pw").await.unwrap(), "token:kara");
    }

    #[tokio::test]
    async fn change_password_requires_the_old_one() {
        let accounts = Arc::new(InMemoryAccounts::default());
        let svc = service(&accounts);
        svc.signup("kara", "pw", "pw").await.unwrap();
        assert!(matches!(
            svc.change_password("kara", "nope", "new").await,
            Err(AppError::AuthError(_))
        ));
        svc.change_password("kara", "pw", "new").await.unwrap();
        assert!(svc.login("kara", "pw").await.is_err());
        assert!(svc.login("kara", "new").await.is_ok());
    }
}
