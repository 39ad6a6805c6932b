//! CSV trajectory report adapter.

use crate::domain::error::EstateSimError;
use crate::domain::simulation::Trajectory;
use crate::ports::report_port::ReportPort;
use std::path::Path;

/// Writes one row per trajectory point.
pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, trajectory: &Trajectory, output_path: &Path) -> Result<(), EstateSimError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(|e| EstateSimError::Data {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        for point in &trajectory.points {
            writer.serialize(point).map_err(|e| EstateSimError::Data {
                reason: format!("failed to write report row: {}", e),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
