//! User directory port - identity lookup for notification addressing

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::UserRecord;

/// Lookup of account-owning users. The transfer orchestrator resolves the
/// destination owner through this port to address the incoming notice.
pub trait UserDirectory {
    fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>>;

    /// Seed path used by the front end and tests.
    fn add_user(&self, user: &UserRecord) -> Result<()>;
}
