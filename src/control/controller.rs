/// Trait for steering controllers.
///
/// Implement this to plug a different control law into the trial driver.
pub trait SteeringController {
    /// Feed one tracking-error sample and return the corrective output.
    fn control(&mut self, error: f64) -> f64;

    /// Reset controller internal state (e.g., PID accumulators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
