use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};

use crate::relaxation::{LinearConstraint, OracleError, RelaxationModel, RelaxationSolver, RelaxedSolution, Sense};


/** relaxation solver backed by good_lp (minilp backend).
The LP is rebuilt from the model at every call: the model itself persists
across the whole search, only the solver-side problem is recreated.
*/
#[derive(Debug, Default)]
pub struct GoodLpSolver {
    /// number of LPs solved so far
    nb_solves: usize,
}

impl GoodLpSolver {
    /// creates a solver
    pub fn new() -> Self { Self::default() }

    /// number of LPs solved so far
    pub fn nb_solves(&self) -> usize { self.nb_solves }

    /// builds the ∑ coeff.x part of a constraint
    fn lhs(c:&LinearConstraint, x:&[Variable]) -> Expression {
        let mut res = Expression::with_capacity(c.terms.len());
        for (v,coeff) in &c.terms { res.add_mul(*coeff, x[*v]); }
        res
    }
}

impl RelaxationSolver for GoodLpSolver {
    fn solve(&mut self, model:&RelaxationModel) -> Result<RelaxedSolution, OracleError> {
        self.nb_solves += 1;
        let n = model.nb_vars();
        let mut vars = ProblemVariables::new();
        // 0 <= x_v <= 1
        let x:Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.).max(1.))).collect();
        // max ∑ x_v
        let mut obj_expr = Expression::with_capacity(n);
        for xv in x.iter() { obj_expr.add_mul(1., *xv); }
        let mut problem = vars.maximise(obj_expr).using(default_solver);
        for c in model.constraints() {
            let lhs = Self::lhs(c, &x);
            let rhs = c.rhs;
            match c.sense {
                Sense::LessEq => problem.add_constraint(constraint!(lhs <= rhs)),
                Sense::Eq => problem.add_constraint(constraint!(lhs == rhs)),
            };
        }
        match problem.solve() {
            Ok(sol) => {
                let values:Vec<f64> = x.iter().map(|xv| sol.value(*xv)).collect();
                let objective = values.iter().sum();
                Ok(RelaxedSolution { values, objective })
            },
            Err(ResolutionError::Infeasible) => Err(OracleError::Infeasible),
            Err(e) => Err(OracleError::Solver(format!("{:?}", e))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::relaxation::ConstraintKind;

    #[test]
    fn test_unconstrained() {
        let model = RelaxationModel::new(3, vec![]);
        let sol = GoodLpSolver::new().solve(&model).unwrap();
        assert!((sol.objective - 3.).abs() < 1e-6);
        for v in sol.values { assert!((v - 1.).abs() < 1e-6); }
    }

    #[test]
    fn test_independent_set_constraint() {
        // x0 + x1 + x2 <= 1, x3 free
        let model = RelaxationModel::new(4, vec![LinearConstraint::at_most_one(&[0,1,2])]);
        let sol = GoodLpSolver::new().solve(&model).unwrap();
        assert!((sol.objective - 2.).abs() < 1e-6);
    }

    #[test]
    fn test_odd_cycle_is_fractional() {
        // 5-cycle complement constraints: optimum 2.5 with every x = 0.5
        let base = vec![
            LinearConstraint::at_most_one(&[0,2]), LinearConstraint::at_most_one(&[0,3]),
            LinearConstraint::at_most_one(&[1,3]), LinearConstraint::at_most_one(&[1,4]),
            LinearConstraint::at_most_one(&[2,4]),
        ];
        let model = RelaxationModel::new(5, base);
        let sol = GoodLpSolver::new().solve(&model).unwrap();
        assert!((sol.objective - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_pins() {
        let mut model = RelaxationModel::new(2, vec![LinearConstraint::at_most_one(&[0,1])]);
        model.push(ConstraintKind::Branch, "b1".to_string(), LinearConstraint::pin(0, 1.));
        model.push(ConstraintKind::Branch, "b2".to_string(), LinearConstraint::pin(1, 1.));
        let mut solver = GoodLpSolver::new();
        assert_eq!(solver.solve(&model), Err(OracleError::Infeasible));
        assert_eq!(solver.nb_solves(), 1);
    }
}
