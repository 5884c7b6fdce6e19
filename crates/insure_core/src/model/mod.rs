mod results;
mod series;
mod state;

pub use results::{CppiRun, SimulationBatch};
pub use series::{ReturnPaths, ReturnSeries};
pub use state::{BindingConstraint, PortfolioState};
