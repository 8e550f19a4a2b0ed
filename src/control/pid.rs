use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// PID Controller (cross-track error -> steering)
// ---------------------------------------------------------------------------

/// Discrete PID controller driven once per telemetry sample.
///
/// The error terms are plain per-sample quantities: no time step is involved,
/// and the output is not clamped. Bounding the output to the actuator range is
/// left to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    p_error: f64,
    i_error: f64,
    d_error: f64,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        let mut pid = Self::default();
        pid.initialize(kp, ki, kd);
        pid
    }

    /// Build a controller from a `[kp, ki, kd]` gain vector.
    pub fn from_gains(gains: &Vector3<f64>) -> Self {
        Self::new(gains[0], gains[1], gains[2])
    }

    /// Overwrite the gains and zero all three error accumulators.
    pub fn initialize(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self.p_error = 0.0;
        self.i_error = 0.0;
        self.d_error = 0.0;
    }

    pub fn set_gains(&mut self, gains: &Vector3<f64>) {
        self.initialize(gains[0], gains[1], gains[2]);
    }

    /// Feed the latest error sample.
    ///
    /// The derivative term uses the previous proportional error, so it must be
    /// computed before `p_error` is overwritten.
    pub fn update_error(&mut self, error: f64) {
        self.d_error = error - self.p_error;
        self.i_error += error;
        self.p_error = error;
    }

    /// Corrective output for the current error state. Pure.
    pub fn compute_output(&self) -> f64 {
        -self.kp * self.p_error - self.kd * self.d_error - self.ki * self.i_error
    }

    pub fn gains(&self) -> Vector3<f64> {
        Vector3::new(self.kp, self.ki, self.kd)
    }

    pub fn p_error(&self) -> f64 {
        self.p_error
    }

    pub fn i_error(&self) -> f64 {
        self.i_error
    }

    pub fn d_error(&self) -> f64 {
        self.d_error
    }

    /// Zero the accumulators while keeping the current gains.
    pub fn reset(&mut self) {
        self.initialize(self.kp, self.ki, self.kd);
    }
}

impl super::SteeringController for Pid {
    fn control(&mut self, error: f64) -> f64 {
        self.update_error(error);
        self.compute_output()
    }

    fn reset(&mut self) {
        Pid::reset(self);
    }

    fn name(&self) -> &str {
        "Pid"
    }
}
