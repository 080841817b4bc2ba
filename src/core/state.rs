use serde::{Deserialize, Serialize};

/// Whether the world is being authored or simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimulationMode {
    #[default]
    Editing,
    Running,
}

/// Authored value plus the runtime copy mutated while the simulation runs.
///
/// Exactly one of the two is active; all mutation goes to the active one, so
/// stopping the simulation restores the authored data untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DualState<T> {
    initial: T,
    live: T,
    mode: SimulationMode,
}

impl<T: Clone> DualState<T> {
    pub fn new(value: T) -> Self {
        Self {
            live: value.clone(),
            initial: value,
            mode: SimulationMode::Editing,
        }
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn get(&self) -> &T {
        match self.mode {
            SimulationMode::Editing => &self.initial,
            SimulationMode::Running => &self.live,
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        match self.mode {
            SimulationMode::Editing => &mut self.initial,
            SimulationMode::Running => &mut self.live,
        }
    }

    /// The authored value, regardless of mode.
    pub fn initial(&self) -> &T {
        &self.initial
    }

    /// Seeds the runtime copy from the authored value and activates it.
    pub fn start(&mut self) {
        self.live = self.initial.clone();
        self.mode = SimulationMode::Running;
    }

    /// Re-activates the authored value; runtime changes are discarded.
    pub fn stop(&mut self) {
        self.mode = SimulationMode::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mutations_do_not_touch_authored_value() {
        let mut state = DualState::new(1);
        *state.get_mut() = 2;
        assert_eq!(*state.get(), 2);

        state.start();
        assert_eq!(*state.get(), 2);
        *state.get_mut() = 7;
        assert_eq!(*state.get(), 7);
        assert_eq!(*state.initial(), 2);

        state.stop();
        assert_eq!(state.mode(), SimulationMode::Editing);
        assert_eq!(*state.get(), 2);

        state.start();
        assert_eq!(*state.get(), 2, "restart reseeds from the authored value");
    }
}
