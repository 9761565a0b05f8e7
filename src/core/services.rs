use crate::auth::jwt::{Claims, JwtService};
use crate::constants::{
    BILL_SPLIT_QUERIED, EXPENSE_ADDED, EXPENSE_DELETED, GROUP_CREATED, GROUP_DELETED, MAX_DESCRIPTION_LENGTH,
    MAX_EXPENSE_AMOUNT, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH, MEMBER_ADDED, MEMBER_REMOVED, MIN_PASSWORD_LENGTH,
    USER_LOGGED_IN, USER_REGISTERED,
};
use crate::core::errors::BillSplitError;
use crate::core::models::{
    audit::AppLog,
    expense::{Category, Expense},
    group::{Group, GroupMember, Role},
    user::{User, UserProfile},
};
use crate::core::settlement::{self, ExpenseRecord, Money, SettlementReport};
use crate::infrastructure::logging::{LogFilter, LoggingService};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct BillSplitService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    jwt_service: JwtService,
    bcrypt_cost: u32,
}

impl<L: LoggingService, S: Storage> BillSplitService<L, S> {
    pub fn new(storage: S, logging: L, jwt_service: JwtService, bcrypt_cost: u32) -> Self {
        BillSplitService {
            storage,
            logging,
            jwt_service,
            bcrypt_cost,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, BillSplitError> {
        self.jwt_service.validate_token(token)
    }

    async fn require_user(&self, user_id: &str) -> Result<User, BillSplitError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| BillSplitError::UserNotFound(user_id.to_string()))
    }

    async fn require_group(&self, group_id: &str) -> Result<Group, BillSplitError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| BillSplitError::GroupNotFound(group_id.to_string()))
    }

    async fn validate_group_membership(&self, group_id: &str, user_id: &str) -> Result<Group, BillSplitError> {
        let group = self.require_group(group_id).await?;
        if !group.is_member(user_id) {
            warn!("User {} is not a member of group {}", user_id, group_id);
            return Err(BillSplitError::NotGroupMember(user_id.to_string()));
        }
        Ok(group)
    }

    async fn validate_group_and_creator(&self, group_id: &str, user_id: &str) -> Result<Group, BillSplitError> {
        let group = self.require_group(group_id).await?;
        if !group.is_creator(user_id) {
            warn!("User {} is not the creator of group {}", user_id, group_id);
            return Err(BillSplitError::NotGroupCreator(user_id.to_string()));
        }
        Ok(group)
    }

    async fn audit(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: &str,
        group_id: Option<&str>,
    ) -> Result<(), BillSplitError> {
        self.logging.log_action(action, details, Some(user_id), group_id).await
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), BillSplitError> {
        if value.trim().is_empty() {
            return Err(BillSplitError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(BillSplitError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(BillSplitError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<Money, BillSplitError> {
        if !amount.is_finite() {
            return Err(BillSplitError::invalid_input(
                field,
                "Invalid Amount",
                "Amount must be a finite number",
            ));
        }
        if amount <= 0.0 {
            return Err(BillSplitError::invalid_input(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount > MAX_EXPENSE_AMOUNT {
            return Err(BillSplitError::invalid_input(
                field,
                "Amount Too Large",
                "Amount cannot exceed 1,000,000",
            ));
        }
        let cents = amount * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            return Err(BillSplitError::invalid_input(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(Money::from_major(amount)?)
    }

    fn validate_email(&self, email: &str) -> Result<(), BillSplitError> {
        if email.is_empty() {
            return Err(BillSplitError::MissingEmail);
        }
        let valid = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
            None => false,
        };
        if !valid || email.len() < 5 {
            return Err(BillSplitError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    fn validate_group_roles(&self, group: &Group) -> Result<(), BillSplitError> {
        let owner_count = group.members.iter().filter(|m| m.is_owner()).count();
        if owner_count != 1 {
            return Err(BillSplitError::InvalidOwnerCount(owner_count));
        }
        Ok(())
    }

    // USERS

    /// Creates an account and returns it with a fresh bearer token.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(UserProfile, String), BillSplitError> {
        let username = username.trim().to_string();
        let email = email.trim().to_lowercase();
        self.validate_string_input("username", &username, MAX_USERNAME_LENGTH)?;
        self.validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(BillSplitError::invalid_input(
                "password",
                "Invalid password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            ));
        }

        let password_hash = bcrypt::hash(&password, self.bcrypt_cost)
            .map_err(|e| BillSplitError::InternalServerError(format!("Password hashing error: {}", e)))?;

        let user = self
            .storage
            .create_user(User {
                id: Uuid::new_v4().to_string(),
                username,
                email,
                password_hash,
                created_at: Utc::now(),
            })
            .await?;
        info!("Registered user {}", user.id);

        self.audit(
            USER_REGISTERED,
            json!({ "user_id": user.id, "username": user.username }),
            &user.id,
            None,
        )
        .await?;

        let token = self.jwt_service.generate_token(&user.id)?;
        Ok((user.profile(), token))
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(UserProfile, String), BillSplitError> {
        let user = self
            .storage
            .get_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(BillSplitError::InvalidCredentials)?;

        let verified = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| BillSplitError::InternalServerError(format!("Password verification error: {}", e)))?;
        if !verified {
            warn!("Failed login for user {}", user.id);
            return Err(BillSplitError::InvalidCredentials);
        }

        self.audit(USER_LOGGED_IN, json!({ "user_id": user.id }), &user.id, None)
            .await?;
        let token = self.jwt_service.generate_token(&user.id)?;
        Ok((user.profile(), token))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, BillSplitError> {
        Ok(self.storage.get_user(user_id).await?.map(|u| u.profile()))
    }

    /// Case-insensitive match on username or email, never returning the caller.
    pub async fn search_users(&self, query: &str, caller_id: &str) -> Result<Vec<UserProfile>, BillSplitError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(BillSplitError::invalid_input(
                "q",
                "Invalid query",
                "Search query cannot be empty",
            ));
        }

        let mut found: Vec<UserProfile> = self
            .storage
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.id != caller_id)
            .filter(|u| u.username.to_lowercase().contains(&needle) || u.email.contains(&needle))
            .map(|u| u.profile())
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        debug!("User search '{}' matched {} users", needle, found.len());
        Ok(found)
    }

    // GROUPS

    pub async fn create_group(
        &self,
        name: String,
        member_ids: Vec<String>,
        created_by: &str,
    ) -> Result<Group, BillSplitError> {
        let creator = self.require_user(created_by).await?;
        let name = name.trim().to_string();
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;

        let mut ordered_ids = vec![creator.id.clone()];
        for id in member_ids {
            if !ordered_ids.contains(&id) {
                ordered_ids.push(id);
            }
        }

        let users = futures::future::try_join_all(ordered_ids.iter().map(|id| self.require_user(id))).await?;
        let members = users
            .into_iter()
            .map(|user| GroupMember {
                role: if user.id == creator.id {
                    Role::Owner
                } else {
                    Role::Member
                },
                user: user.profile(),
            })
            .collect();

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            creator_id: creator.id.clone(),
            members,
            created_at: now,
            updated_at: now,
        };

        self.validate_group_roles(&group)?;
        self.storage.save_group(group.clone()).await?;
        info!("Created group {} with {} members", group.id, group.members.len());

        self.audit(
            GROUP_CREATED,
            json!({
                "group_id": group.id,
                "name": group.name,
                "member_ids": group.member_ids(),
            }),
            &creator.id,
            Some(&group.id),
        )
        .await?;

        Ok(group)
    }

    pub async fn get_my_groups(&self, user_id: &str) -> Result<Vec<Group>, BillSplitError> {
        self.storage.get_user_groups(user_id).await
    }

    pub async fn get_group(&self, group_id: &str, caller_id: &str) -> Result<Group, BillSplitError> {
        self.validate_group_membership(group_id, caller_id).await
    }

    pub async fn add_member(&self, group_id: &str, member_id: &str, added_by: &str) -> Result<Group, BillSplitError> {
        self.validate_group_and_creator(group_id, added_by).await?;
        let user = self.require_user(member_id).await?;

        let group = self
            .storage
            .add_group_member(
                group_id,
                GroupMember {
                    user: user.profile(),
                    role: Role::Member,
                },
            )
            .await?;
        info!("Added user {} to group {}", member_id, group_id);

        self.audit(
            MEMBER_ADDED,
            json!({ "group_id": group_id, "user_id": member_id }),
            added_by,
            Some(group_id),
        )
        .await?;
        Ok(group)
    }

    /// Removes a member. A member who paid for any expense in the group stays
    /// until those expenses are deleted.
    pub async fn remove_member(
        &self,
        group_id: &str,
        member_id: &str,
        removed_by: &str,
    ) -> Result<Group, BillSplitError> {
        self.validate_group_and_creator(group_id, removed_by).await?;
        let group = self
            .storage
            .remove_group_member(group_id, member_id)
            .await
            .inspect_err(|e| warn!("Could not remove user {} from group {}: {}", member_id, group_id, e))?;
        info!("Removed user {} from group {}", member_id, group_id);

        self.audit(
            MEMBER_REMOVED,
            json!({ "group_id": group_id, "user_id": member_id }),
            removed_by,
            Some(group_id),
        )
        .await?;
        Ok(group)
    }

    pub async fn delete_group(&self, group_id: &str, deleted_by: &str) -> Result<(), BillSplitError> {
        let group = self.validate_group_and_creator(group_id, deleted_by).await?;
        self.storage.delete_group(group_id).await?;
        info!("Deleted group {}", group_id);

        self.audit(
            GROUP_DELETED,
            json!({ "group_id": group_id, "name": group.name }),
            deleted_by,
            Some(group_id),
        )
        .await?;
        Ok(())
    }

    // EXPENSES

    /// Records an expense paid by the caller.
    pub async fn add_expense(
        &self,
        group_id: &str,
        description: String,
        amount: f64,
        category: Category,
        paid_by: &str,
    ) -> Result<Expense, BillSplitError> {
        let description = description.trim().to_string();
        self.validate_string_input("description", &description, MAX_DESCRIPTION_LENGTH)?;
        let amount = self.validate_amount_input("amount", amount)?;

        let group = self.validate_group_membership(group_id, paid_by).await?;
        let payer = self.require_user(paid_by).await?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description,
            amount,
            category,
            payer: payer.profile(),
            group_id: group.id.clone(),
            split_details: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.storage.save_expense(expense.clone()).await?;
        info!("Added expense {} of {} to group {}", expense.id, amount, group.id);

        self.audit(
            EXPENSE_ADDED,
            json!({
                "expense_id": expense.id,
                "group_id": group.id,
                "description": expense.description,
                "amount": expense.amount,
                "paid_by_id": paid_by,
            }),
            paid_by,
            Some(&group.id),
        )
        .await?;

        Ok(expense)
    }

    /// Newest first.
    pub async fn get_group_expenses(&self, group_id: &str, caller_id: &str) -> Result<Vec<Expense>, BillSplitError> {
        self.validate_group_membership(group_id, caller_id).await?;
        self.storage.get_group_expenses(group_id).await
    }

    pub async fn delete_expense(&self, expense_id: &str, deleted_by: &str) -> Result<(), BillSplitError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| BillSplitError::ExpenseNotFound(expense_id.to_string()))?;
        if expense.payer.id != deleted_by {
            warn!("User {} attempted to delete expense {} paid by someone else", deleted_by, expense_id);
            return Err(BillSplitError::NotExpensePayer(
                deleted_by.to_string(),
                expense_id.to_string(),
            ));
        }

        self.storage.delete_expense(expense_id).await?;
        info!("Deleted expense {}", expense_id);

        self.audit(
            EXPENSE_DELETED,
            json!({ "expense_id": expense_id, "group_id": expense.group_id }),
            deleted_by,
            Some(&expense.group_id),
        )
        .await?;
        Ok(())
    }

    // BILL SPLIT

    /// Works out who owes whom in a group from one consistent snapshot of its
    /// membership and expenses.
    pub async fn get_bill_split(&self, group_id: &str, caller_id: &str) -> Result<SettlementReport, BillSplitError> {
        let snapshot = self
            .storage
            .load_bill_snapshot(group_id)
            .await?
            .ok_or_else(|| BillSplitError::GroupNotFound(group_id.to_string()))?;
        if !snapshot.group.is_member(caller_id) {
            warn!("User {} is not a member of group {}", caller_id, group_id);
            return Err(BillSplitError::NotGroupMember(caller_id.to_string()));
        }

        let members = snapshot.group.member_ids();
        let records: Vec<ExpenseRecord> = snapshot.expenses.iter().map(Expense::record).collect();
        let report = settlement::compute_settlement(&members, &records)?;
        debug!(
            "Bill split for group {} over {} expenses produced {} transactions",
            group_id,
            records.len(),
            report.transactions().len()
        );

        self.audit(
            BILL_SPLIT_QUERIED,
            json!({ "group_id": group_id, "transaction_count": report.transactions().len() }),
            caller_id,
            Some(group_id),
        )
        .await?;
        Ok(report)
    }

    /// Whole audit trail, oldest first. Not exposed over HTTP.
    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, BillSplitError> {
        self.logging.get_logs(&LogFilter::default()).await
    }

    /// Actions performed by the caller.
    pub async fn get_my_activity(&self, caller_id: &str) -> Result<Vec<AppLog>, BillSplitError> {
        self.logging
            .get_logs(&LogFilter {
                user_id: Some(caller_id.to_string()),
                ..LogFilter::default()
            })
            .await
    }

    /// Everything that happened in a group, visible to its members.
    pub async fn get_group_activity(&self, group_id: &str, caller_id: &str) -> Result<Vec<AppLog>, BillSplitError> {
        self.validate_group_membership(group_id, caller_id).await?;
        self.logging
            .get_logs(&LogFilter {
                group_id: Some(group_id.to_string()),
                ..LogFilter::default()
            })
            .await
    }
}
