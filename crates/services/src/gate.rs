//! Actor-permission gate.
//!
//! Students own and may submit/resubmit their own records only; faculty
//! act only on records of students assigned to them as advisor; admins
//! are unrestricted on the flag/delete/restore and account axes.

use domains::error::{DomainError, Result};
use domains::models::{Account, Role, Session};
use domains::ports::AccountRepo;
use uuid::Uuid;

pub(crate) fn require_role(session: Session, role: Role) -> Result<()> {
    if session.role != role {
        return Err(DomainError::Permission(format!(
            "requires {} role",
            role.as_str()
        )));
    }
    Ok(())
}

/// Looks up the caller's account and checks it is an active student.
pub(crate) async fn active_student(
    accounts: &dyn AccountRepo,
    session: Session,
) -> Result<Account> {
    require_role(session, Role::Student)?;
    let account = accounts
        .get(session.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("account", session.user_id))?;
    if !account.active {
        return Err(DomainError::Permission("account is deactivated".into()));
    }
    Ok(account)
}

/// Faculty may act on a record only when they are the advisor-of-record
/// for the owning student. Admins pass unconditionally.
pub(crate) async fn advisor_or_admin(
    accounts: &dyn AccountRepo,
    session: Session,
    owner_student_id: Uuid,
) -> Result<()> {
    match session.role {
        Role::Admin => Ok(()),
        Role::Faculty => {
            let owner = accounts
                .get(owner_student_id)
                .await?
                .ok_or_else(|| DomainError::not_found("account", owner_student_id))?;
            if owner.advisor_id == Some(session.user_id) {
                Ok(())
            } else {
                Err(DomainError::Permission(
                    "faculty is not the advisor of record for this student".into(),
                ))
            }
        }
        Role::Student => Err(DomainError::Permission(
            "students may not act on the verification queue".into(),
        )),
    }
}
