//! Admin command - Grants or revokes the administrator role.

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::AppResult;
use crate::infra::{Database, UserRepository, UserStore};
use crate::services::normalize_email;

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config.database_url).await?;
    let users = UserStore::new(db.get_connection());

    let (email, role) = match args.action {
        AdminAction::Grant { email } => (email, UserRole::Admin),
        AdminAction::Revoke { email } => (email, UserRole::User),
    };

    let user = users.set_role(&normalize_email(&email), role).await?;
    tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "Role updated");
    println!("{} is now {}", user.email, user.role);

    Ok(())
}
