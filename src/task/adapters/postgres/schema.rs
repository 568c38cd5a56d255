//! Diesel schema for task persistence.

diesel::table! {
    /// Task documents partitioned by company, with embedded subtasks and
    /// status history stored as JSONB.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning company partition.
        #[max_length = 255]
        company_name -> Varchar,
        /// Task name.
        name -> Text,
        /// Task description.
        description -> Text,
        /// Assigned user emails as a JSON array.
        assigned_to -> Jsonb,
        /// Administrator emails as a JSON array.
        task_admin -> Jsonb,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority label.
        #[max_length = 50]
        priority -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Optional dependency target.
        depends_on -> Nullable<Uuid>,
        /// Names of tasks depending on this one as a JSON array.
        dependent_tasks -> Jsonb,
        /// Embedded subtasks as a JSON array.
        subtasks -> Jsonb,
        /// Status history as a JSON array.
        status_updates -> Jsonb,
        /// Optimistic concurrency version.
        version -> Int8,
    }
}
