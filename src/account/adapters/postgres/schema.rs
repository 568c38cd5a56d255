//! Diesel schema for user persistence.

diesel::table! {
    /// Global user credential records keyed by email and company.
    users (email, company_name) {
        /// Normalized email address.
        #[max_length = 320]
        email -> Varchar,
        /// Company the user belongs to.
        #[max_length = 255]
        company_name -> Varchar,
        /// Display name.
        name -> Text,
        /// Salted password hash.
        password_hash -> Text,
        /// Authorization role.
        #[max_length = 50]
        role -> Varchar,
        /// Whether the user must change their password.
        is_first_login -> Bool,
        /// Whether the user is the bootstrap admin.
        is_initial_admin -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
