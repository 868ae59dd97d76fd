//! Forwarding simulator output to an external status channel.

use tracing::info;

/// Receives simulator output lines for a status channel.
///
/// Called synchronously once per non-empty line. Delivery is the publisher's
/// concern; failures must not abort the run, so `publish` returns nothing.
pub trait StatusPublisher {
    fn publish(&self, channel: &str, line: &str);
}

/// Publisher that emits each line as an `info` tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl StatusPublisher for TracingPublisher {
    fn publish(&self, channel: &str, line: &str) {
        info!(target: "wepp_runner::status", channel, "{line}");
    }
}

/// A publisher bound to one channel id.
#[derive(Clone, Copy)]
pub struct StatusChannel<'a> {
    pub channel: &'a str,
    pub publisher: &'a dyn StatusPublisher,
}

impl<'a> StatusChannel<'a> {
    pub fn new(channel: &'a str, publisher: &'a dyn StatusPublisher) -> Self {
        Self { channel, publisher }
    }

    pub fn publish(&self, line: &str) {
        self.publisher.publish(self.channel, line);
    }
}
