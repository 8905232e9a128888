// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! UDP statsd sink (spec §6 "statsd"). No dedicated statsd crate appears
//! anywhere in the reference pack, so this talks the wire protocol
//! directly over a connected `UdpSocket`, the same way a teacher-style
//! adapter would wrap a small protocol with no existing crate worth
//! pulling in.

use logshipper_engine::sinks::{SinkError, StatsdKind, StatsdMetric, StatsdSink};
use std::net::UdpSocket;

pub struct StatsdUdpSink {
    socket: UdpSocket,
}

impl StatsdUdpSink {
    pub fn connect(target: impl std::net::ToSocketAddrs) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(target)?;
        Ok(Self { socket })
    }

    fn wire(metric: &StatsdMetric) -> String {
        let value = metric.value * metric.multiplier;
        match metric.kind {
            StatsdKind::Counter => format!("{}:{}|c", metric.name, value),
            StatsdKind::Gauge { delta: true } => {
                let sign = if value >= 0.0 { "+" } else { "" };
                format!("{}:{sign}{}|g", metric.name, value)
            }
            StatsdKind::Gauge { delta: false } => format!("{}:{}|g", metric.name, value),
            StatsdKind::Timer => format!("{}:{}|ms", metric.name, value),
        }
    }
}

impl StatsdSink for StatsdUdpSink {
    fn emit(&self, metric: StatsdMetric) -> Result<(), SinkError> {
        let line = Self::wire(&metric);
        self.socket
            .send(line.as_bytes())
            .map(|_| ())
            .map_err(|e| SinkError(e.to_string()))
    }
}
