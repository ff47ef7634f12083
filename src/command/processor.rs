use super::command_trait::AudioCommand;
use crate::audio::{EffectStatePool, MixBufferPool};
use crate::config::RendererConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request to stop the current tick at the next command boundary
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume a pending request
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

struct CommandEntry {
    command: Box<dyn AudioCommand>,
    scheduled: bool,
}

/// Ordered list of commands for one tick
#[derive(Default)]
pub struct CommandList {
    entries: Vec<CommandEntry>,
}

impl std::fmt::Debug for CommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.command.name(), e.scheduled)))
            .finish()
    }
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a command. New commands are scheduled until `verify` says otherwise.
    pub fn push(&mut self, command: Box<dyn AudioCommand>) {
        self.entries.push(CommandEntry {
            command,
            scheduled: true,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the command at `index` will be processed (as opposed to bypassed)
    pub fn is_scheduled(&self, index: usize) -> bool {
        self.entries.get(index).map_or(false, |e| e.scheduled)
    }

    /// Verify every command, unscheduling the ones that fail
    ///
    /// # Returns
    /// Number of commands rejected
    pub fn verify(&mut self, mix_buffers: &MixBufferPool, states: &EffectStatePool) -> usize {
        let mut rejected = 0;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.scheduled = entry.command.verify(mix_buffers, states);
            if !entry.scheduled {
                log::warn!(
                    "{} at index {} failed verification, bypassing",
                    entry.command.name(),
                    index
                );
                rejected += 1;
            }
        }
        rejected
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Commands whose `process` ran
    pub processed: usize,
    /// Commands that were bypassed after failing verification
    pub bypassed: usize,
    /// The tick stopped early at a command boundary
    pub cancelled: bool,
    pub elapsed: Duration,
    pub deadline_missed: bool,
}

/// Executes command lists against the mix buffer pool, one tick at a time
///
/// Commands run strictly in list order on the calling thread: command N may
/// consume what command N-1 wrote into the pool.
#[derive(Debug)]
pub struct CommandListProcessor {
    mix_buffers: MixBufferPool,
    render_deadline: Duration,
    cancel: CancelToken,
}

impl CommandListProcessor {
    pub fn new(config: &RendererConfig) -> Self {
        Self::with_pool(
            MixBufferPool::new(config.mix_buffer_count as usize, config.sample_count as usize),
            config.render_deadline(),
        )
    }

    pub fn with_pool(mix_buffers: MixBufferPool, render_deadline: Duration) -> Self {
        Self {
            mix_buffers,
            render_deadline,
            cancel: CancelToken::new(),
        }
    }

    pub fn mix_buffers(&self) -> &MixBufferPool {
        &self.mix_buffers
    }

    pub fn mix_buffers_mut(&mut self) -> &mut MixBufferPool {
        &mut self.mix_buffers
    }

    pub fn sample_count(&self) -> usize {
        self.mix_buffers.sample_count()
    }

    pub fn render_deadline(&self) -> Duration {
        self.render_deadline
    }

    /// Handle that can cancel a tick from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Verify `list` against this processor's pool
    pub fn verify(&self, list: &mut CommandList, states: &EffectStatePool) -> usize {
        list.verify(&self.mix_buffers, states)
    }

    /// Run one tick
    pub fn process(&mut self, list: &mut CommandList, states: &mut EffectStatePool) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();

        for entry in list.entries.iter_mut() {
            if self.cancel.take() {
                report.cancelled = true;
                log::debug!("Tick cancelled after {} commands", report.processed + report.bypassed);
                break;
            }

            if entry.scheduled {
                entry.command.process(&mut self.mix_buffers, states);
                report.processed += 1;
            } else {
                entry.command.bypass(&mut self.mix_buffers);
                report.bypassed += 1;
            }
        }

        report.elapsed = start.elapsed();
        report.deadline_missed = report.elapsed > self.render_deadline;
        if report.deadline_missed {
            log::warn!(
                "Tick took {:?}, over the {:?} rendering time limit",
                report.elapsed,
                self.render_deadline
            );
        }
        report
    }

    /// Describe every command in `list`
    pub fn dump(&self, list: &CommandList) -> String {
        let mut output = String::new();
        for entry in &list.entries {
            entry.command.dump(&mut output);
        }
        log::debug!("Command list:\n{}", output);
        output
    }
}
