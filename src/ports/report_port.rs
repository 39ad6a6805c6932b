//! Trajectory report port trait.

use crate::domain::error::EstateSimError;
use crate::domain::simulation::Trajectory;
use std::path::Path;

/// Port for writing simulation results.
pub trait ReportPort {
    fn write(&self, trajectory: &Trajectory, output_path: &Path) -> Result<(), EstateSimError>;
}
