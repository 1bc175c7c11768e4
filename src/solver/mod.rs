mod goal;
mod goal_solver;

pub use goal::Goal;
pub use goal_solver::{solve, Certainty, SolutionSet, Solver};
