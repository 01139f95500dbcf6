use uuid::Uuid;

use crate::user::{User, UserRole};
use crate::{CoreError, CoreResult};

/// Authorization checks live here so route handlers stop re-deriving role comparisons
/// ad hoc. Every check either passes or yields an AuthorizationError.

pub fn require_role(user: &User, role: UserRole) -> CoreResult<()> {
    if user.role == role || user.role == UserRole::PlatformAdmin {
        Ok(())
    } else {
        Err(CoreError::AuthorizationError(format!(
            "Requires {} role",
            role.as_str()
        )))
    }
}

pub fn require_platform_admin(user: &User) -> CoreResult<()> {
    if user.role == UserRole::PlatformAdmin {
        Ok(())
    } else {
        Err(CoreError::AuthorizationError(
            "Requires platform administrator".to_string(),
        ))
    }
}

/// The resource belongs to `owner_id`, or the caller is a platform admin.
pub fn require_owner(user: &User, owner_id: Uuid, what: &str) -> CoreResult<()> {
    if user.id == owner_id || user.role == UserRole::PlatformAdmin {
        Ok(())
    } else {
        Err(CoreError::AuthorizationError(format!(
            "{} does not belong to you",
            what
        )))
    }
}

/// Winery-side management: a winery admin acting on their own winery, or a platform
/// admin acting on any.
pub fn require_winery_manager(user: &User, winery_owner_id: Uuid) -> CoreResult<()> {
    if user.role == UserRole::PlatformAdmin {
        return Ok(());
    }
    if user.role == UserRole::WineryAdmin && user.id == winery_owner_id {
        return Ok(());
    }
    Err(CoreError::AuthorizationError(
        "Winery does not belong to you".to_string(),
    ))
}
