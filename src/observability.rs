use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("chatdesk.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("chatdesk.client.request_errors");
pub(crate) static CLIENT_CONNECTION_ERRORS: Counter =
    Counter::new("chatdesk.client.connection_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("chatdesk.client.request_duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("chatdesk.chat.sends");
pub(crate) static CHAT_SEND_FAILURES: Counter = Counter::new("chatdesk.chat.send_failures");
pub(crate) static CHAT_SENDS_IGNORED: Counter = Counter::new("chatdesk.chat.sends_ignored");
pub(crate) static CHAT_DELETES: Counter = Counter::new("chatdesk.chat.deletes");
pub(crate) static CHAT_CLEARS: Counter = Counter::new("chatdesk.chat.clears");

pub(crate) static AUTH_LOGINS: Counter = Counter::new("chatdesk.auth.logins");
pub(crate) static AUTH_FAILURES: Counter = Counter::new("chatdesk.auth.failures");
pub(crate) static AUTH_VALIDATION_FAILURES: Counter =
    Counter::new("chatdesk.auth.validation_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_CONNECTION_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SEND_FAILURES);
    collector.register_counter(&CHAT_SENDS_IGNORED);
    collector.register_counter(&CHAT_DELETES);
    collector.register_counter(&CHAT_CLEARS);

    collector.register_counter(&AUTH_LOGINS);
    collector.register_counter(&AUTH_FAILURES);
    collector.register_counter(&AUTH_VALIDATION_FAILURES);
}
