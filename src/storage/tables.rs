use redb::TableDefinition;

/// Tutors: tutor_id -> Tutor (bincode)
pub const TUTORS: TableDefinition<&str, &[u8]> = TableDefinition::new("tutors");

/// Unique-email index: email -> tutor_id
pub const TUTOR_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("tutor_emails");

/// Courses: code -> Course (bincode)
pub const COURSES: TableDefinition<&str, &[u8]> = TableDefinition::new("courses");

/// Help requests: request_id -> HelpRequest (bincode)
pub const REQUESTS: TableDefinition<&str, &[u8]> = TableDefinition::new("requests");
