use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use p25_core::StreamId;

use crate::channel::call_state::ChannelCallState;
use crate::channel::worker::{ChannelCommand, ChannelEvent, ChannelWorker};
use crate::codec::Vocoder;
use crate::crypto::cipher::CipherEngine;
use crate::network::VoiceTransport;

/// Owner-side handle of a channel worker thread. Submissions never block; events are
/// drained from `events()`.
pub struct ChannelHandle {
    name: String,
    command_sender: Sender<ChannelCommand>,
    event_receiver: Receiver<ChannelEvent>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl ChannelHandle {
    /// Spawn a worker thread owning `state`
    pub fn spawn<V, C, T>(
        state: ChannelCallState<C>,
        tx_vocoder: V,
        rx_vocoder: V,
        transport: T,
        hold_limit: Duration,
    ) -> std::io::Result<Self>
    where
        V: Vocoder + 'static,
        C: CipherEngine + 'static,
        T: VoiceTransport + 'static,
    {
        let (event_sender, event_receiver) = unbounded::<ChannelEvent>();
        let (command_sender, command_receiver) = unbounded::<ChannelCommand>();

        let name = state.name.clone();
        let handle = thread::Builder::new().name(format!("p25-ch-{}", name)).spawn(move || {
            let mut worker = ChannelWorker::new(
                state,
                tx_vocoder,
                rx_vocoder,
                transport,
                hold_limit,
                event_sender,
                command_receiver,
            );
            worker.run();
        })?;

        Ok(Self {
            name,
            command_sender,
            event_receiver,
            worker_handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, cmd: ChannelCommand) -> bool {
        if self.command_sender.send(cmd).is_err() {
            tracing::warn!(ch = %self.name, "channel worker gone, command dropped");
            return false;
        }
        true
    }

    /// Queue one PCM chunk for transmission
    pub fn push_pcm(&self, pcm: Vec<i16>) -> bool {
        self.submit(ChannelCommand::Pcm(pcm))
    }

    pub fn ptt_release(&self) -> bool {
        self.submit(ChannelCommand::PttRelease)
    }

    /// Queue an inbound frame (DUID byte followed by the record stream)
    pub fn submit_frame(&self, stream_id: StreamId, payload: Vec<u8>) -> bool {
        self.submit(ChannelCommand::Frame {
            stream_id,
            payload,
            received: Instant::now(),
        })
    }

    pub fn events(&self) -> &Receiver<ChannelEvent> {
        &self.event_receiver
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        tracing::debug!(ch = %self.name, "shutting down channel worker");
        let _ = self.command_sender.send(ChannelCommand::Shutdown);

        if let Some(handle) = self.worker_handle.take() {
            let timeout = Duration::from_secs(3);
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    let _ = handle.join();
                    break;
                }
                if start.elapsed() >= timeout {
                    tracing::warn!(ch = %self.name, "channel worker did not finish in time, abandoning");
                    break;
                }
                thread::sleep(Duration::from_millis(20));
            }
        }
    }
}
