use clap::ValueEnum;
use drift_core::{Command, Event, SimulationConfig, SimulationError};
use drift_system_sound::{Sound, Tone};
use drift_system_statistics::{Statistics, StatsReport};
use drift_world::{apply, query, Board, Simulation};
use rand_chacha::ChaCha8Rng;

/// User actions offered by the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Action {
    /// Move the current path a single step.
    Next,
    /// Run the current path until it loops or falls.
    Complete,
    /// Finish the current path and start the next one.
    Advance,
    /// Run every remaining path on the board.
    Run,
    /// Discard the simulation and start a new one.
    Reset,
}

/// What the controller reports after a user action.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Signal {
    /// Statistics captured after the action.
    pub(crate) report: StatsReport,
    /// Tones requested by the sound system.
    pub(crate) tones: Vec<Tone>,
}

/// Owns the simulation and routes user actions through the world and the systems.
#[derive(Debug)]
pub(crate) struct Controller {
    config: SimulationConfig,
    template: Option<Board>,
    rng: ChaCha8Rng,
    simulation: Simulation,
    sound: Sound,
    statistics: Statistics,
    events: Vec<Event>,
}

impl Controller {
    /// Starts a simulation from `config`, or on `template` when a board was supplied.
    pub(crate) fn new(
        config: SimulationConfig,
        template: Option<Board>,
        mut rng: ChaCha8Rng,
        sound: Sound,
    ) -> Result<Self, SimulationError> {
        let simulation = start(&config, template.as_ref(), &mut rng)?;
        Ok(Self {
            config,
            template,
            rng,
            simulation,
            sound,
            statistics: Statistics::new(),
            events: Vec::new(),
        })
    }

    /// Read-only access to the simulation.
    pub(crate) fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Reports the state of a freshly started simulation.
    pub(crate) fn signal_start(&mut self) -> Signal {
        self.events.clear();
        self.events.push(Event::StatusChanged {
            status: query::status(&self.simulation),
        });
        self.signal()
    }

    /// Performs `action` and returns one signal per reported step.
    ///
    /// Actions that the current state does not offer are skipped.
    pub(crate) fn perform(&mut self, action: Action) -> Result<Vec<Signal>, SimulationError> {
        let available = StatsReport::capture(&self.simulation).actions;
        let enabled = match action {
            Action::Next => available.next,
            Action::Complete => available.complete,
            Action::Advance => available.advance,
            Action::Run => available.run,
            Action::Reset => true,
        };
        if !enabled {
            tracing::warn!(
                ?action,
                status = %query::status(&self.simulation),
                "action is not available"
            );
            return Ok(Vec::new());
        }

        match action {
            Action::Next => Ok(vec![self.execute(Command::AdvancePath)?]),
            Action::Complete => Ok(vec![self.execute(Command::CompletePath)?]),
            Action::Advance => {
                let completed = self.execute(Command::CompletePath)?;
                let advanced = self.execute(Command::AdvanceBoard)?;
                Ok(vec![completed, advanced])
            }
            Action::Run => Ok(vec![self.execute(Command::CompleteBoard)?]),
            Action::Reset => {
                self.simulation = start(&self.config, self.template.as_ref(), &mut self.rng)?;
                tracing::info!("simulation reset");
                Ok(vec![self.signal_start()])
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<Signal, SimulationError> {
        self.events.clear();
        apply(&mut self.simulation, command, &mut self.events)?;
        Ok(self.signal())
    }

    fn signal(&mut self) -> Signal {
        let report = self
            .statistics
            .handle(&self.events, &self.simulation)
            .unwrap_or_else(|| StatsReport::capture(&self.simulation));
        let mut tones = Vec::new();
        self.sound.handle(&self.events, &mut tones);
        Signal { report, tones }
    }
}

fn start(
    config: &SimulationConfig,
    template: Option<&Board>,
    rng: &mut ChaCha8Rng,
) -> Result<Simulation, SimulationError> {
    match template {
        Some(board) => Ok(Simulation::start(
            board.clone(),
            config.start_x,
            config.start_y,
            rng,
        )),
        None => Simulation::from_config(config, rng),
    }
}
