pub mod controller;
pub mod pid;

pub use controller::SteeringController;
pub use pid::Pid;
