use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::AppError;
use crate::expenses::repo_types::Expense;

/// Record-scoped actions on an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    View,
    Update,
    Delete,
}

/// Only the owner may act on an expense.
pub fn allows(caller: &User, ability: Ability, expense: &Expense) -> bool {
    match ability {
        Ability::View | Ability::Update | Ability::Delete => caller.id == expense.user_id,
    }
}

/// Expenses may only be filed under, or moved to, the caller's own account.
pub fn may_assign_owner(caller: &User, owner_id: Uuid) -> bool {
    caller.id == owner_id
}

pub fn authorize(caller: &User, ability: Ability, expense: &Expense) -> Result<(), AppError> {
    if allows(caller, ability, expense) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %caller.id,
            expense_id = %expense.id,
            ?ability,
            "policy denied"
        );
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::OffsetDateTime;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn expense_of(owner: &User) -> Expense {
        let now = OffsetDateTime::now_utc();
        Expense {
            id: Uuid::new_v4(),
            user_id: owner.id,
            description: "Aluguel".into(),
            value: Decimal::new(150000, 2),
            date: now.date(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_is_granted_every_ability() {
        let owner = user();
        let expense = expense_of(&owner);
        for ability in [Ability::View, Ability::Update, Ability::Delete] {
            assert!(allows(&owner, ability, &expense));
            assert!(authorize(&owner, ability, &expense).is_ok());
        }
    }

    #[test]
    fn other_users_are_denied_every_ability() {
        let owner = user();
        let stranger = user();
        let expense = expense_of(&owner);
        for ability in [Ability::View, Ability::Update, Ability::Delete] {
            assert!(!allows(&stranger, ability, &expense));
            assert!(matches!(
                authorize(&stranger, ability, &expense),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn owner_assignment_is_limited_to_self() {
        let caller = user();
        assert!(may_assign_owner(&caller, caller.id));
        assert!(!may_assign_owner(&caller, Uuid::new_v4()));
    }
}
