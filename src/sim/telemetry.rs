use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Telemetry in, commands out
// ---------------------------------------------------------------------------

/// One telemetry sample from the controlled process.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Cross-track error: lateral offset from the target path.
    pub cte: f64,
    pub speed: f64,
    /// Steering angle currently applied, in degrees.
    pub steering_angle: f64,
}

/// Actuation sent back to the process after each sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SteerCommand {
    /// Normalized steering in [-1, 1].
    pub steering_angle: f64,
    pub throttle: f64,
}

// ---------------------------------------------------------------------------
// Trial cost
// ---------------------------------------------------------------------------

/// Per-sample squared-error contribution to the trial cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub cte_weight: f64,
    pub angle_weight: f64,
    pub speed_weight: f64,
    pub reference_speed: f64,
}

impl CostModel {
    pub fn sample_cost(&self, t: &Telemetry) -> f64 {
        let speed_err = self.reference_speed - t.speed;
        self.cte_weight * t.cte * t.cte
            + self.angle_weight * t.steering_angle * t.steering_angle
            + self.speed_weight * speed_err * speed_err
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cte_weight: 1.0,
            angle_weight: 1.0,
            speed_weight: 1.0,
            reference_speed: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cost_sums_three_squared_errors() {
        let t = Telemetry { cte: 0.5, speed: 28.0, steering_angle: -3.0 };
        let cost = CostModel::default().sample_cost(&t);
        assert!((cost - (0.25 + 9.0 + 4.0)).abs() < 1e-12);
    }

    #[test]
    fn weights_scale_each_term() {
        let model = CostModel {
            cte_weight: 2.0,
            angle_weight: 0.0,
            speed_weight: 0.5,
            reference_speed: 10.0,
        };
        let t = Telemetry { cte: 1.0, speed: 12.0, steering_angle: 100.0 };
        assert!((model.sample_cost(&t) - (2.0 + 2.0)).abs() < 1e-12);
    }

    #[test]
    fn command_serializes_as_steer_payload() {
        let cmd = SteerCommand { steering_angle: -0.25, throttle: 0.3 };
        let value = serde_json::to_value(cmd).unwrap();
        assert_eq!(value["steering_angle"], -0.25);
        assert_eq!(value["throttle"], 0.3);
    }

    #[test]
    fn telemetry_deserializes_from_json() {
        let t: Telemetry =
            serde_json::from_str(r#"{"cte":0.76,"speed":29.5,"steering_angle":-1.5}"#).unwrap();
        assert_eq!(t, Telemetry { cte: 0.76, speed: 29.5, steering_angle: -1.5 });
    }
}
