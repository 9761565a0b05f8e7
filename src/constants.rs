pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const USER_LOGGED_IN: &str = "USER_LOGGED_IN";
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const GROUP_DELETED: &str = "GROUP_DELETED";
pub const MEMBER_ADDED: &str = "MEMBER_ADDED";
pub const MEMBER_REMOVED: &str = "MEMBER_REMOVED";
pub const EXPENSE_ADDED: &str = "EXPENSE_ADDED";
pub const EXPENSE_DELETED: &str = "EXPENSE_DELETED";
pub const BILL_SPLIT_QUERIED: &str = "BILL_SPLIT_QUERIED";

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_EXPENSE_AMOUNT: f64 = 1_000_000.0;
