//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::AppState;

/// Roles accepted by each guard.
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin];
pub const CLINICIAN_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Doctor];
pub const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Doctor, UserRole::Staff];

/// Check a user's role against an allow-list.
pub fn ensure_role(user: &CurrentUser, allowed: &[UserRole], message: &str) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

/// Resolve whose records a request targets.
///
/// Users holding `own_role` always act on their own id and may not name
/// anyone else. Clinic staff must name the subject explicitly.
pub fn resolve_subject(
    user: &CurrentUser,
    own_role: UserRole,
    requested: Option<Uuid>,
) -> Result<Uuid, AppError> {
    if user.role == own_role {
        return match requested {
            Some(id) if id != user.id => Err(AppError::Forbidden(
                "Access to other users' records is not allowed".to_string(),
            )),
            _ => Ok(user.id),
        };
    }

    if STAFF_ROLES.contains(&user.role) {
        return requested.ok_or_else(|| AppError::Validation("A subject id is required".to_string()));
    }

    Err(AppError::Forbidden("Access denied".to_string()))
}

/// Requires ADMIN.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        ensure_role(&user, ADMIN_ROLES, "Admin access required")?;
        Ok(RequireAdmin(user))
    }
}

/// Requires ADMIN or DOCTOR.
#[derive(Debug, Clone)]
pub struct RequireClinician(pub CurrentUser);

impl FromRequestParts<AppState> for RequireClinician {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        ensure_role(&user, CLINICIAN_ROLES, "Doctor or admin access required")?;
        Ok(RequireClinician(user))
    }
}

/// Requires ADMIN, DOCTOR or STAFF.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub CurrentUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        ensure_role(&user, STAFF_ROLES, "Clinic staff access required")?;
        Ok(RequireStaff(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::nil(),
            email: "u@clinic.test".to_string(),
            role,
            token: String::new(),
            expires_at: 0,
        }
    }

    #[test]
    fn clinician_guard_accepts_admin_and_doctor() {
        assert!(ensure_role(&user(UserRole::Admin), CLINICIAN_ROLES, "x").is_ok());
        assert!(ensure_role(&user(UserRole::Doctor), CLINICIAN_ROLES, "x").is_ok());
        assert!(ensure_role(&user(UserRole::Staff), CLINICIAN_ROLES, "x").is_err());
    }

    #[test]
    fn staff_guard_rejects_patients() {
        assert!(ensure_role(&user(UserRole::Staff), STAFF_ROLES, "x").is_ok());
        let err = ensure_role(&user(UserRole::Patient), STAFF_ROLES, "Clinic staff access required")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Clinic staff access required"));
    }

    #[test]
    fn patient_resolves_only_to_self() {
        let patient = user(UserRole::Patient);
        assert_eq!(resolve_subject(&patient, UserRole::Patient, None).unwrap(), Uuid::nil());
        assert_eq!(
            resolve_subject(&patient, UserRole::Patient, Some(Uuid::nil())).unwrap(),
            Uuid::nil()
        );
        let other = Uuid::new_v4();
        assert!(matches!(
            resolve_subject(&patient, UserRole::Patient, Some(other)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn staff_must_name_subject() {
        let staff = user(UserRole::Staff);
        let id = Uuid::new_v4();
        assert_eq!(resolve_subject(&staff, UserRole::Patient, Some(id)).unwrap(), id);
        assert!(matches!(
            resolve_subject(&staff, UserRole::Patient, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn patient_cannot_resolve_doctor_subject() {
        let patient = user(UserRole::Patient);
        assert!(matches!(
            resolve_subject(&patient, UserRole::Doctor, Some(Uuid::new_v4())),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_guard_is_exclusive() {
        assert!(ensure_role(&user(UserRole::Admin), ADMIN_ROLES, "x").is_ok());
        assert!(ensure_role(&user(UserRole::Doctor), ADMIN_ROLES, "x").is_err());
    }
}
