//! Extraction orchestration.
//!
//! Sequences resolution, pagination, filtering, projection, and writing for
//! one request, with inter-chat pacing. Chats are processed strictly one at
//! a time: the upstream session is shared and rate-sensitive, so the whole
//! request runs as a single critical section.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::domain::{
    ChatOutcome, ConversationHandle, ExportError, ExportSummary, ExtractionRequest, Result, Scope,
    StatusReport,
};
use crate::infrastructure::{AppConfig, ExportSink, MessageTransport, SessionGate};

use super::pager::collect_history;
use super::projector::project;
use super::resolver::resolve_scope;
use super::window::filter_and_sort;

/// The extraction service exposed to the front door.
pub struct Exporter {
    gate: Arc<SessionGate>,
    transport: Arc<dyn MessageTransport>,
    config: AppConfig,
    // One request owns the session at a time; a second is rejected, not queued.
    in_flight: Mutex<()>,
}

impl Exporter {
    #[must_use]
    pub fn new(
        gate: Arc<SessionGate>,
        transport: Arc<dyn MessageTransport>,
        config: AppConfig,
    ) -> Self {
        Self {
            gate,
            transport,
            config,
            in_flight: Mutex::new(()),
        }
    }

    /// Gate status for the front door.
    #[must_use]
    pub fn status(&self) -> StatusReport {
        StatusReport {
            ready: self.gate.is_ready(),
        }
    }

    /// Lists exportable chats (gate-checked, pseudo-chats excluded).
    ///
    /// # Errors
    /// Returns `NotReady` when the gate is closed, `ResolutionFailed` on
    /// transport failure.
    pub async fn list_chats(&self) -> Result<Vec<ConversationHandle>> {
        if !self.gate.is_ready() {
            return Err(ExportError::NotReady);
        }

        resolve_scope(self.transport.as_ref(), &Scope::AllChats)
            .await
            .map(|resolved| resolved.handles)
    }

    /// Runs one extraction request end to end and reports the output file
    /// plus per-chat counts. Zero-count chats appear in the summary; a chat
    /// whose pagination failed is flagged truncated and the request keeps
    /// going. Only gate, validation, resolution, and sink errors abort.
    ///
    /// # Errors
    /// `NotReady`, `Busy`, `InvalidRequest`, `InvalidIdentifier`,
    /// `ConversationNotFound`, `ResolutionFailed`, or `SinkWrite`.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExportSummary> {
        // Gate and validation come before any transport call.
        if !self.gate.is_ready() {
            return Err(ExportError::NotReady);
        }
        request.validate()?;

        let _guard = self.in_flight.try_lock().map_err(|_| ExportError::Busy)?;

        tracing::info!(
            start = %request.window_start,
            end = %request.window_end,
            "extraction started"
        );

        tracing::debug!(phase = "resolving");
        let resolved = resolve_scope(self.transport.as_ref(), &request.scope).await?;

        let mut sink = ExportSink::create(
            &self.config.output.dir,
            &request,
            resolved.single_id.as_deref(),
        )?;
        sink.write_header(&request, resolved.single_id.as_deref())?;

        let mut outcomes = Vec::with_capacity(resolved.handles.len());

        for (index, handle) in resolved.handles.iter().enumerate() {
            // Pace the shared session between chats, not before the first.
            if index > 0 {
                sleep(self.config.pager.chat_delay()).await;
            }

            let outcome = self.process_chat(handle, &request, &mut sink).await?;
            outcomes.push(outcome);
        }

        let output_file = sink.finish()?;

        let summary = ExportSummary {
            output_file,
            chats: outcomes,
        };

        tracing::info!(
            file = %summary.output_file.display(),
            chats = summary.chats.len(),
            records = summary.total_written(),
            "extraction finished"
        );

        Ok(summary)
    }

    /// Pages, filters, projects, and writes one chat.
    async fn process_chat(
        &self,
        handle: &ConversationHandle,
        request: &ExtractionRequest,
        sink: &mut ExportSink,
    ) -> Result<ChatOutcome> {
        tracing::debug!(phase = "paging", chat = %handle.id);
        let history = collect_history(
            self.transport.as_ref(),
            &handle.id,
            request.start_ts(),
            &self.config.pager,
        )
        .await;

        tracing::debug!(phase = "filtering", chat = %handle.id, fetched = history.messages.len());
        let in_window = filter_and_sort(history.messages, request.start_ts(), request.end_ts());

        let records: Vec<_> = in_window
            .iter()
            .map(|m| project(handle, m, &self.config.output.self_label))
            .collect();

        if records.is_empty() {
            tracing::debug!(chat = %handle.id, "no messages in window, skipped");
        } else {
            tracing::debug!(phase = "writing", chat = %handle.id, records = records.len());
            sink.write_chat(handle.title(), &handle.id, &records)?;
        }

        Ok(ChatOutcome {
            id: handle.id.clone(),
            title: handle.title().to_string(),
            written: records.len(),
            truncated: history.truncated,
        })
    }
}
