pub mod time;

/// Generates a long random id, used for new workflows.
pub fn longid() -> String {
    nanoid::nanoid!(21)
}

/// Generates a short random id, used for notifications.
pub fn shortid() -> String {
    nanoid::nanoid!(8)
}
