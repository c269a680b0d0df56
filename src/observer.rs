//! Hooks into the Verlet world's step.

/// Observes a [`VerletWorld`](crate::world::VerletWorld) step.
///
/// All methods default to no-ops. The overlay renders after
/// `on_step_complete`, so anything hooked here sees post-step positions.
pub trait StepObserver {
    /// Called after all particles have been integrated in a sub-step.
    fn on_integrate(&mut self) {}

    /// Called after each constraint iteration.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called once the step is complete; `step` counts from 1.
    fn on_step_complete(&mut self, _step: u64) {}
}

/// Observer that ignores everything.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
