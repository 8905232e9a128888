// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! RabbitMQ sink: opaque, logged stub. No AMQP crate appears anywhere in
//! the reference pack; real framing is explicitly out of scope (spec
//! enrichment note: "sinks stay as opaque, logged stubs per §6").

use logshipper_engine::sinks::{RabbitmqSink, SinkError};

pub struct RabbitmqLoggedSink {
    pub exchange: String,
    pub routing_key: String,
}

impl RabbitmqSink for RabbitmqLoggedSink {
    fn publish(&self, body: serde_json::Value) -> Result<(), SinkError> {
        tracing::info!(
            exchange = %self.exchange,
            routing_key = %self.routing_key,
            body = %body,
            "rabbitmq publish (stub, no AMQP connection established)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_never_fails() {
        let sink = RabbitmqLoggedSink {
            exchange: "logs".to_string(),
            routing_key: "app".to_string(),
        };
        assert!(sink.publish(serde_json::json!({"message": "hi"})).is_ok());
    }
}
