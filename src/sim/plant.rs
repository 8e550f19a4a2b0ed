use super::telemetry::{SteerCommand, Telemetry};

/// The controlled process seen by the trial driver.
///
/// The driver never knows how a process resets; it only asks for it at
/// every trial boundary.
pub trait Plant {
    /// Current telemetry sample.
    fn observe(&self) -> Telemetry;

    /// Apply one actuation command and advance by one sample.
    fn apply(&mut self, cmd: &SteerCommand);

    /// Return to the starting condition.
    fn reset(&mut self);

    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Lane-keeping stand-in
// ---------------------------------------------------------------------------

/// Kinematic lane-keeping stand-in: constant speed, front-wheel steering with
/// a fixed mechanical drift, lateral offset reported as cross-track error.
#[derive(Debug, Clone)]
pub struct LanePlant {
    pub initial_offset: f64, // m
    pub speed: f64,          // m/s, held constant
    pub wheelbase: f64,      // m
    pub drift: f64,          // rad, added to every steering command
    pub max_steer: f64,      // rad at a normalized command of 1.0
    pub dt: f64,             // s per sample
    offset: f64,
    heading: f64,
    steer_deg: f64,
}

impl LanePlant {
    pub fn new(initial_offset: f64, speed: f64) -> Self {
        Self {
            initial_offset,
            speed,
            wheelbase: 2.7,
            drift: 1.0_f64.to_radians(),
            max_steer: 25.0_f64.to_radians(),
            dt: 0.05,
            offset: initial_offset,
            heading: 0.0,
            steer_deg: 0.0,
        }
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Default for LanePlant {
    fn default() -> Self {
        Self::new(1.0, 30.0)
    }
}

impl Plant for LanePlant {
    fn observe(&self) -> Telemetry {
        Telemetry {
            cte: self.offset,
            speed: self.speed,
            steering_angle: self.steer_deg,
        }
    }

    fn apply(&mut self, cmd: &SteerCommand) {
        let steer = cmd.steering_angle.clamp(-1.0, 1.0) * self.max_steer;
        self.steer_deg = steer.to_degrees();
        self.heading += self.speed / self.wheelbase * (steer + self.drift).tan() * self.dt;
        self.offset += self.speed * self.heading.sin() * self.dt;
    }

    fn reset(&mut self) {
        self.offset = self.initial_offset;
        self.heading = 0.0;
        self.steer_deg = 0.0;
    }

    fn name(&self) -> &str {
        "LanePlant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Pid, SteeringController};

    fn drive(pid: &mut Pid, plant: &mut LanePlant, samples: usize) {
        for _ in 0..samples {
            let out = pid.control(plant.observe().cte);
            plant.apply(&SteerCommand { steering_angle: out.clamp(-1.0, 1.0), throttle: 0.3 });
        }
    }

    #[test]
    fn pd_gains_pull_vehicle_toward_path() {
        let mut plant = LanePlant::default();
        let mut pid = Pid::new(0.2, 0.0, 3.0);
        drive(&mut pid, &mut plant, 200);
        assert!(plant.offset().abs() < 0.5, "offset {} should shrink", plant.offset());
    }

    #[test]
    fn zero_gains_drift_away() {
        let mut plant = LanePlant::default();
        let mut pid = Pid::new(0.0, 0.0, 0.0);
        drive(&mut pid, &mut plant, 200);
        assert!(plant.offset() > 10.0, "uncorrected drift should grow, got {}", plant.offset());
    }

    #[test]
    fn reset_restores_start() {
        let mut plant = LanePlant::default();
        plant.apply(&SteerCommand { steering_angle: 0.5, throttle: 0.3 });
        plant.apply(&SteerCommand { steering_angle: 0.5, throttle: 0.3 });
        assert!(plant.observe().steering_angle > 0.0);
        plant.reset();
        assert_eq!(plant.observe(), Telemetry { cte: 1.0, speed: 30.0, steering_angle: 0.0 });
    }
}
