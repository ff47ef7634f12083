use crate::audio::{EffectStatePool, MixBufferPool, StateId};
use crate::command::{
    CancelToken, CommandList, CommandListProcessor, EffectId, RenderCommand, RenderEvent,
    TickReport,
};
use crate::config::RendererConfig;
use crate::effects::{DelayCommand, DelayParameters, DelayState, ParameterState};
use crate::error::{ConfigError, ControllerError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A delay effect instance owned by the renderer
#[derive(Debug)]
struct DelaySlot {
    id: EffectId,
    state: StateId,
    parameter: DelayParameters,
    enabled: bool,
}

impl DelaySlot {
    fn command(&self) -> DelayCommand {
        DelayCommand::new(
            self.parameter.inputs.map(i16::from),
            self.parameter.outputs.map(i16::from),
            self.parameter.clone(),
            self.state,
            self.enabled,
        )
    }
}

/// Renders ticks on the DSP thread: owns the mix buffers, the effect state and
/// the effect slots. The command list is kept between ticks and rebuilt only
/// after a slot changes.
pub struct Renderer {
    config: RendererConfig,
    processor: CommandListProcessor,
    states: EffectStatePool,
    delays: Vec<DelaySlot>,

    // Command list reused across ticks, rebuilt only after a slot changes
    list: CommandList,
    list_dirty: bool,

    // Lock-free communication
    command_rx: rtrb::Consumer<RenderCommand>,
    event_tx: rtrb::Producer<RenderEvent>,

    // Shared tick counter for control-thread reads
    ticks_atomic: Arc<AtomicU64>,
    ticks: u64,
}

impl Renderer {
    /// Create a renderer with communication channels
    pub fn new(
        config: RendererConfig,
        command_rx: rtrb::Consumer<RenderCommand>,
        event_tx: rtrb::Producer<RenderEvent>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            processor: CommandListProcessor::new(&config),
            config,
            states: EffectStatePool::new(),
            delays: Vec::new(),
            list: CommandList::new(),
            list_dirty: false,
            command_rx,
            event_tx,
            ticks_atomic: Arc::new(AtomicU64::new(0)),
            ticks: 0,
        })
    }

    /// Get a controller for the control thread
    pub fn get_controller(&self, command_tx: rtrb::Producer<RenderCommand>) -> RendererController {
        RendererController {
            command_tx,
            ticks: Arc::clone(&self.ticks_atomic),
            next_effect_id: 0,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn mix_buffers(&self) -> &MixBufferPool {
        self.processor.mix_buffers()
    }

    /// Mix buffers, for filling inputs before a tick and reading outputs after it
    pub fn mix_buffers_mut(&mut self) -> &mut MixBufferPool {
        self.processor.mix_buffers_mut()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.processor.cancel_token()
    }

    pub fn effect_count(&self) -> usize {
        self.delays.len()
    }

    /// Current state of a delay effect, if it exists
    pub fn delay_state(&self, id: EffectId) -> Option<&DelayState> {
        let slot = self.delays.iter().find(|slot| slot.id == id)?;
        self.states.get::<DelayState>(slot.state)
    }

    /// Render one tick
    pub fn render_tick(&mut self) -> TickReport {
        while let Ok(cmd) = self.command_rx.pop() {
            self.handle_command(cmd);
        }

        if self.list_dirty {
            self.rebuild_command_list();
        }

        self.processor.verify(&mut self.list, &self.states);
        for (index, slot) in self.delays.iter().enumerate() {
            if !self.list.is_scheduled(index) {
                let _ = self.event_tx.push(RenderEvent::EffectRejected(slot.id));
            }
        }

        let report = self.processor.process(&mut self.list, &mut self.states);

        // Initialize/update requests are one-shot once an enabled effect has consumed them
        let ran = report.processed + report.bypassed;
        for (index, slot) in self.delays.iter_mut().enumerate().take(ran) {
            let pending = slot.parameter.state != ParameterState::Updated;
            if pending && slot.enabled && self.list.is_scheduled(index) {
                slot.parameter.state = ParameterState::Updated;
                self.list_dirty = true;
            }
        }

        self.ticks += 1;
        self.ticks_atomic.store(self.ticks, Ordering::Relaxed);
        let event = if report.deadline_missed {
            RenderEvent::DeadlineMissed(self.ticks, report.elapsed)
        } else {
            RenderEvent::TickRendered(self.ticks, report.elapsed)
        };
        let _ = self.event_tx.push(event);

        report
    }

    /// Describe the command list the next tick would run
    pub fn dump(&self) -> String {
        self.processor.dump(&self.build_command_list())
    }

    fn build_command_list(&self) -> CommandList {
        let mut list = CommandList::with_capacity(self.delays.len());
        for slot in &self.delays {
            list.push(Box::new(slot.command()));
        }
        list
    }

    fn rebuild_command_list(&mut self) {
        self.list.clear();
        for slot in &self.delays {
            self.list.push(Box::new(slot.command()));
        }
        self.list_dirty = false;
    }

    /// Handle a command from the control thread
    fn handle_command(&mut self, cmd: RenderCommand) {
        self.list_dirty = true;
        match cmd {
            RenderCommand::AddDelay(id, parameter, enabled) => {
                if self.delays.iter().any(|slot| slot.id == id) {
                    log::warn!("Delay effect {} already exists, updating instead", id);
                    self.handle_command(RenderCommand::UpdateDelay(id, parameter));
                    return;
                }
                let state = self.states.insert(DelayState::new());
                self.delays.push(DelaySlot {
                    id,
                    state,
                    parameter,
                    enabled,
                });
            }
            RenderCommand::UpdateDelay(id, mut parameter) => {
                match self.delays.iter_mut().find(|slot| slot.id == id) {
                    Some(slot) => {
                        // Delay lines are sized per channel, so a layout change must re-initialize.
                        // A pending initialize survives later updates until a tick consumes it.
                        if parameter.channel_count != slot.parameter.channel_count
                            || slot.parameter.state == ParameterState::Initialized
                        {
                            parameter.state = ParameterState::Initialized;
                        }
                        slot.parameter = parameter;
                    }
                    None => self.report_unknown(id),
                }
            }
            RenderCommand::SetEffectEnabled(id, enabled) => {
                match self.delays.iter_mut().find(|slot| slot.id == id) {
                    Some(slot) => slot.enabled = enabled,
                    None => self.report_unknown(id),
                }
            }
            RenderCommand::RemoveEffect(id) => {
                match self.delays.iter().position(|slot| slot.id == id) {
                    Some(index) => {
                        let slot = self.delays.remove(index);
                        self.states.remove(slot.state);
                    }
                    None => self.report_unknown(id),
                }
            }
        }
    }

    fn report_unknown(&mut self, id: EffectId) {
        log::warn!("Command for unknown effect {}", id);
        let _ = self.event_tx.push(RenderEvent::UnknownEffect(id));
    }
}

/// Controller for the renderer that can be used from the control thread
pub struct RendererController {
    command_tx: rtrb::Producer<RenderCommand>,
    ticks: Arc<AtomicU64>,
    next_effect_id: EffectId,
}

impl RendererController {
    fn send(&mut self, cmd: RenderCommand) -> Result<(), ControllerError> {
        self.command_tx.push(cmd).map_err(|_| ControllerError::QueueFull)
    }

    /// Create a delay effect and return its id
    pub fn add_delay(
        &mut self,
        parameter: DelayParameters,
        enabled: bool,
    ) -> Result<EffectId, ControllerError> {
        let id = self.next_effect_id;
        self.send(RenderCommand::AddDelay(id, parameter, enabled))?;
        self.next_effect_id += 1;
        Ok(id)
    }

    /// Replace a delay effect's parameters
    pub fn update_delay(
        &mut self,
        id: EffectId,
        parameter: DelayParameters,
    ) -> Result<(), ControllerError> {
        self.send(RenderCommand::UpdateDelay(id, parameter))
    }

    /// Decode a guest parameter block and forward it. Unknown versions never reach the renderer.
    pub fn update_delay_from_bytes(
        &mut self,
        id: EffectId,
        version: u32,
        bytes: &[u8],
    ) -> Result<(), ControllerError> {
        let parameter = DelayParameters::decode(version, bytes)?;
        self.update_delay(id, parameter)
    }

    pub fn set_effect_enabled(
        &mut self,
        id: EffectId,
        enabled: bool,
    ) -> Result<(), ControllerError> {
        self.send(RenderCommand::SetEffectEnabled(id, enabled))
    }

    pub fn remove_effect(&mut self, id: EffectId) -> Result<(), ControllerError> {
        self.send(RenderCommand::RemoveEffect(id))
    }

    /// Number of ticks rendered so far
    pub fn ticks_rendered(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}
