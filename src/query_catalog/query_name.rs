/// Keys the MySQL adapters look up in the catalog.
pub struct QueryName;

impl QueryName {
    pub const SELECT_USER_BY_LOGIN: &'static str = "select_user_by_login";
    pub const SELECT_LATEST_AUTH_CODE: &'static str = "select_latest_auth_code_by_user_id";
    pub const SELECT_AUTH_CODES_SINCE: &'static str = "select_auth_codes_by_user_id_since";
    pub const SELECT_CARDS_BY_USER: &'static str = "select_card_info_by_user_id";

    pub const CLEAR_CARD_TRANSACTIONS: &'static str = "clear_card_transactions";
    pub const CLEAR_CARDS: &'static str = "clear_cards";
    pub const CLEAR_AUTH_CODES: &'static str = "clear_auth_codes";
    pub const CLEAR_USERS: &'static str = "clear_users";

    /// Foreign keys point from left to right, so rows are deleted in this order.
    pub const CLEANUP_ORDER: [&'static str; 4] = [
        Self::CLEAR_CARD_TRANSACTIONS,
        Self::CLEAR_CARDS,
        Self::CLEAR_AUTH_CODES,
        Self::CLEAR_USERS,
    ];

    pub const REQUIRED: [&'static str; 8] = [
        Self::SELECT_USER_BY_LOGIN,
        Self::SELECT_LATEST_AUTH_CODE,
        Self::SELECT_AUTH_CODES_SINCE,
        Self::SELECT_CARDS_BY_USER,
        Self::CLEAR_CARD_TRANSACTIONS,
        Self::CLEAR_CARDS,
        Self::CLEAR_AUTH_CODES,
        Self::CLEAR_USERS,
    ];
}
