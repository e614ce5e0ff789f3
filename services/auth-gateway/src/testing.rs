//! In-memory identity provider for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use identity::{BoxFuture, IdentityProvider, ProviderUser, SignUp, UserMetadata};

struct StoredUser {
    password: String,
    user: ProviderUser,
}

/// Provider double backed by a `Mutex<Vec<_>>`. Knobs cover the failure
/// modes the gateway has to normalize: duplicate emails, bad credentials,
/// missing subjects, a provider that drops metadata, and a sign-out outage.
pub struct InMemoryProvider {
    users: Mutex<Vec<StoredUser>>,
    next_id: AtomicU64,
    sign_out_calls: AtomicU64,
    strip_metadata: bool,
    fail_sign_out: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            sign_out_calls: AtomicU64::new(0),
            strip_metadata: false,
            fail_sign_out: false,
        }
    }

    /// Echo no metadata back from sign-up, like a backend that defers
    /// profile fields until confirmation.
    pub fn with_stripped_metadata(mut self) -> Self {
        self.strip_metadata = true;
        self
    }

    /// Make every sign-out call fail.
    pub fn with_failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    /// Insert a user directly, returning its id.
    pub fn seed(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> String {
        let id = self.alloc_id();
        self.users.lock().unwrap().push(StoredUser {
            password: password.to_owned(),
            user: ProviderUser {
                id: id.clone(),
                email: email.to_owned(),
                user_metadata: UserMetadata {
                    first_name: first_name.map(str::to_owned),
                    last_name: last_name.map(str::to_owned),
                },
            },
        });
        id
    }

    pub fn delete_user(&self, user_id: &str) {
        self.users.lock().unwrap().retain(|u| u.user.id != user_id);
    }

    pub fn sign_out_calls(&self) -> u64 {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn alloc_id(&self) -> String {
        format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn find_by_id(&self, user_id: &str) -> Option<ProviderUser> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone())
    }
}

impl IdentityProvider for InMemoryProvider {
    fn id(&self) -> &str {
        "in-memory"
    }

    fn sign_up<'a>(&'a self, signup: &'a SignUp) -> BoxFuture<'a, identity::Result<ProviderUser>> {
        Box::pin(async move {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.user.email == signup.email) {
                return Err(identity::Error::EmailTaken);
            }
            let metadata = if self.strip_metadata {
                UserMetadata::default()
            } else {
                UserMetadata {
                    first_name: signup.first_name.clone(),
                    last_name: signup.last_name.clone(),
                }
            };
            let user = ProviderUser {
                id: format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                email: signup.email.clone(),
                user_metadata: metadata,
            };
            users.push(StoredUser {
                password: signup.password.clone(),
                user: user.clone(),
            });
            Ok(user)
        })
    }

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, identity::Result<ProviderUser>> {
        Box::pin(async move {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.user.email == email && u.password == password)
                .map(|u| u.user.clone())
                .ok_or(identity::Error::InvalidCredentials)
        })
    }

    fn sign_out<'a>(&'a self, _user_id: &'a str) -> BoxFuture<'a, identity::Result<()>> {
        Box::pin(async move {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out {
                return Err(identity::Error::Provider("sign-out unavailable".into()));
            }
            Ok(())
        })
    }

    fn get_user_by_id<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, identity::Result<ProviderUser>> {
        Box::pin(async move {
            self.find_by_id(user_id)
                .ok_or_else(|| identity::Error::UserNotFound(user_id.to_owned()))
        })
    }

    fn admin_get_user_by_id<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, identity::Result<ProviderUser>> {
        self.get_user_by_id(user_id)
    }
}
