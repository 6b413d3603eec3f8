use std::time::Duration;

pub const LESSON_TTL: Duration = Duration::from_secs(10 * 60);
pub const LESSON_LIST_TTL: Duration = Duration::from_secs(60);

pub fn lesson_key(lesson_id: &str) -> String {
    format!("lesson:{}", lesson_id)
}

/// Progress-enriched list for one user, access tier and serialized query.
pub fn lesson_list_key(user_id: &str, is_premium: bool, query_json: &str) -> String {
    let tier = if is_premium { "premium" } else { "standard" };
    format!("{}{}:{}", user_lessons_prefix(user_id), tier, query_json)
}

/// Prefix covering every cached list of a user.
pub fn user_lessons_prefix(user_id: &str) -> String {
    format!("lessons:{}:", user_id)
}
