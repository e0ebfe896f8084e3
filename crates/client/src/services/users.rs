use api_types::user::{MinimalModifyUser, ReadUser, RestrictedUserModify};

use crate::{connector::Connector, error::Result, session::Session};

const USERS: &str = "users";
const ME: &str = "users/me";

#[derive(Debug, Clone)]
pub struct UserService {
    connector: Connector,
}

impl UserService {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        self.connector.login(username, password).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.connector.logout().await
    }

    pub async fn register(&self, user: &RestrictedUserModify) -> Result<ReadUser> {
        self.connector.add(USERS, user).await
    }

    pub async fn me(&self) -> Result<ReadUser> {
        self.connector.get(ME).await
    }

    pub async fn update(&self, user: &MinimalModifyUser) -> Result<ReadUser> {
        self.connector.update(ME, user).await
    }

    /// Deletes the current user and drops the now useless session.
    pub async fn delete(&self) -> Result<()> {
        self.connector.delete(ME).await?;
        self.connector.logout().await
    }
}
