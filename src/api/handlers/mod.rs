mod auth;
mod courses;
mod requests;
mod roster;

pub use auth::{complete_reset, initiate_reset, is_authenticated, login, register};
pub use courses::{list_courses, upsert_course};
pub use requests::{
    comment, complete, currently_helping, help, list_queue, list_recent, submit,
};
pub use roster::{
    is_coordinator, list_tutors, set_active, set_coordinator, set_inactive, unset_coordinator,
};
