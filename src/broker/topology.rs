//! Fixed broker topology, declared idempotently on every (re)connect.

pub const EXCHANGE_RESUME: &str = "resume.exchange";
pub const EXCHANGE_USER: &str = "user.exchange";

pub const QUEUE_RESUME_UPDATE: &str = "resume.update";
pub const QUEUE_RESUME_NOTIFICATION: &str = "resume.notification";
pub const QUEUE_USER_ACTIVITY: &str = "user.activity";

pub const KEY_RESUME_UPDATE: &str = "resume.update.key";
pub const KEY_RESUME_NOTIFICATION: &str = "resume.notification.key";
pub const KEY_USER_ACTIVITY: &str = "user.activity.key";

/// (queue, exchange, routing key) bindings for the direct exchanges.
pub const BINDINGS: [(&str, &str, &str); 3] = [
    (QUEUE_RESUME_UPDATE, EXCHANGE_RESUME, KEY_RESUME_UPDATE),
    (QUEUE_RESUME_NOTIFICATION, EXCHANGE_RESUME, KEY_RESUME_NOTIFICATION),
    (QUEUE_USER_ACTIVITY, EXCHANGE_USER, KEY_USER_ACTIVITY),
];

#[cfg(test)]
mod tests {
    use super::*;

    // Other services bind to these names; changing one is a wire break.
    #[test]
    fn topology_names_are_wire_exact() {
        assert_eq!(EXCHANGE_RESUME, "resume.exchange");
        assert_eq!(EXCHANGE_USER, "user.exchange");
        assert_eq!(QUEUE_RESUME_UPDATE, "resume.update");
        assert_eq!(QUEUE_RESUME_NOTIFICATION, "resume.notification");
        assert_eq!(QUEUE_USER_ACTIVITY, "user.activity");
        assert_eq!(KEY_RESUME_UPDATE, "resume.update.key");
        assert_eq!(KEY_RESUME_NOTIFICATION, "resume.notification.key");
        assert_eq!(KEY_USER_ACTIVITY, "user.activity.key");
    }

    #[test]
    fn every_queue_is_bound_exactly_once() {
        let mut queues: Vec<_> = BINDINGS.iter().map(|(queue, _, _)| *queue).collect();
        queues.dedup();
        assert_eq!(queues.len(), BINDINGS.len());
    }
}
