// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Elasticsearch HTTP sink (spec §6): `PUT {base_url}/{index}/{doctype}/{id}`
//! with the message as the JSON body. The trait method is synchronous, so
//! requests are hinted to a background task over an unbounded channel, the
//! same bridge-a-sync-call-onto-async-I/O pattern the engine's `sinks`
//! module doc comment describes.

use logshipper_engine::sinks::{ElasticsearchSink, SinkError};
use tokio::sync::mpsc::{self, UnboundedSender};

struct PutJob {
    index: String,
    doctype: String,
    id: String,
    document: serde_json::Value,
}

pub struct ElasticsearchHttpSink {
    tx: UnboundedSender<PutJob>,
}

impl ElasticsearchHttpSink {
    /// Spawns the background worker onto the current Tokio runtime.
    /// `base_url` has no trailing slash, e.g. `http://localhost:9200`.
    pub fn spawn(base_url: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PutJob>();
        let client = reqwest::Client::new();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let url = format!("{base_url}/{}/{}/{}", job.index, job.doctype, job.id);
                if let Err(e) = client.put(&url).json(&job.document).send().await {
                    tracing::warn!(error = %e, %url, "elasticsearch put failed");
                }
            }
        });

        Self { tx }
    }
}

impl ElasticsearchSink for ElasticsearchHttpSink {
    fn put_document(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), SinkError> {
        self.tx
            .send(PutJob {
                index: index.to_string(),
                doctype: doctype.to_string(),
                id: id.to_string(),
                document,
            })
            .map_err(|_| SinkError("elasticsearch worker task has shut down".to_string()))
    }
}
