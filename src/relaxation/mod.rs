//! Fractional relaxation of the maximum clique problem.
//!
//! The model holds one variable x_i ∈ [0,1] per vertex and maximizes ∑ x_i.
//! Base constraints are fixed once the model is built. Branch and cut
//! constraints are stacked on top of them and only removed in LIFO order,
//! either explicitly or by dropping the [`ConstraintScope`] that added them.

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::graph::VertexId;

/// good_lp based relaxation solver
pub mod lp;

/// identifier of a dynamic constraint (never reused)
pub type ConstraintId = usize;

/// sense of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// ∑ coeff.x ≤ rhs
    LessEq,
    /// ∑ coeff.x = rhs
    Eq,
}

/// ∑ coeff.x_i {≤,=} rhs
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// (variable, coefficient)
    pub terms: Vec<(VertexId, f64)>,
    /// sense
    pub sense: Sense,
    /// right hand side
    pub rhs: f64,
}

impl LinearConstraint {
    /// ∑_{v ∈ vertices} x_v ≤ 1
    pub fn at_most_one(vertices:&[VertexId]) -> Self {
        Self {
            terms: vertices.iter().map(|v| (*v, 1.)).collect(),
            sense: Sense::LessEq,
            rhs: 1.,
        }
    }

    /// x_v = value
    pub fn pin(v:VertexId, value:f64) -> Self {
        Self { terms: vec![(v, 1.)], sense: Sense::Eq, rhs: value }
    }

    /// value of the left hand side for the given point
    pub fn lhs_value(&self, values:&[f64]) -> f64 {
        self.terms.iter().map(|(v,c)| c * values[*v]).sum()
    }
}

/// origin of a dynamic constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// equality pin of a branching decision
    Branch,
    /// separated independent set inequality
    Cut,
    /// non-edge inequality added after an integral non-clique point
    Repair,
}

/// constraint stacked on top of the base model
#[derive(Debug, Clone)]
pub struct DynamicConstraint {
    /// unique identifier
    pub id: ConstraintId,
    /// name (used in logs)
    pub name: String,
    /// origin
    pub kind: ConstraintKind,
    /// the constraint itself
    pub constraint: LinearConstraint,
}

/** persistent constraint system handed to the relaxation solver */
#[derive(Debug, Clone, Default)]
pub struct RelaxationModel {
    /// number of variables (one per vertex)
    nb_vars: usize,
    /// fixed constraints
    base: Vec<LinearConstraint>,
    /// constraint stack
    dynamic: Vec<DynamicConstraint>,
    /// next identifier to assign
    next_id: ConstraintId,
}

impl RelaxationModel {

    /// creates a model with nb_vars variables and the given base constraints
    pub fn new(nb_vars:usize, base:Vec<LinearConstraint>) -> Self {
        Self { nb_vars, base, dynamic: Vec::new(), next_id: 0 }
    }

    /// number of variables
    pub fn nb_vars(&self) -> usize { self.nb_vars }

    /// base constraints
    pub fn base(&self) -> &[LinearConstraint] { &self.base }

    /// dynamic constraints (bottom of the stack first)
    pub fn dynamic(&self) -> &[DynamicConstraint] { &self.dynamic }

    /// number of dynamic constraints currently active
    pub fn dynamic_len(&self) -> usize { self.dynamic.len() }

    /// every active constraint (base first)
    pub fn constraints(&self) -> impl Iterator<Item=&LinearConstraint> {
        self.base.iter().chain(self.dynamic.iter().map(|d| &d.constraint))
    }

    /// pushes a dynamic constraint, returns its identifier
    pub fn push(&mut self, kind:ConstraintKind, name:String, constraint:LinearConstraint) -> ConstraintId {
        let id = self.next_id;
        self.next_id += 1;
        self.dynamic.push(DynamicConstraint { id, name, kind, constraint });
        id
    }

    /** removes the dynamic constraint on top of the stack.
    Returns false (and removes nothing) if id is not on top of the stack.
    */
    pub fn pop(&mut self, id:ConstraintId) -> bool {
        match self.dynamic.last() {
            Some(top) if top.id == id => {
                self.dynamic.pop();
                true
            },
            _ => false,
        }
    }

    /// opens a scope: every constraint pushed through it is removed when it is dropped
    pub fn scope(&mut self) -> ConstraintScope<'_> {
        ConstraintScope { model: self, added: Vec::new() }
    }
}

/** scoped access to the model. Constraints pushed through the scope are popped
(in reverse order) when the scope is dropped, including on early returns.
Dereferences to the model so that nested scopes can be opened from it.
*/
#[derive(Debug)]
pub struct ConstraintScope<'a> {
    /// underlying model
    model: &'a mut RelaxationModel,
    /// constraints added by this scope
    added: Vec<ConstraintId>,
}

impl<'a> ConstraintScope<'a> {
    /// pushes a constraint that lives until the end of the scope
    pub fn add(&mut self, kind:ConstraintKind, name:String, constraint:LinearConstraint) -> ConstraintId {
        let id = self.model.push(kind, name, constraint);
        self.added.push(id);
        id
    }

    /// number of constraints added by this scope
    pub fn nb_added(&self) -> usize { self.added.len() }
}

impl<'a> Deref for ConstraintScope<'a> {
    type Target = RelaxationModel;
    fn deref(&self) -> &RelaxationModel { self.model }
}

impl<'a> DerefMut for ConstraintScope<'a> {
    fn deref_mut(&mut self) -> &mut RelaxationModel { self.model }
}

impl<'a> Drop for ConstraintScope<'a> {
    fn drop(&mut self) {
        while let Some(id) = self.added.pop() {
            let removed = self.model.pop(id);
            debug_assert!(
                removed || std::thread::panicking(),
                "constraint {} is not on top of the stack", id
            );
        }
    }
}

/// optimal point of a relaxation
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedSolution {
    /// value of each variable
    pub values: Vec<f64>,
    /// objective value (∑ x_i)
    pub objective: f64,
}

/// reasons for a relaxation without optimal point
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleError {
    /// the constraint system has no feasible point
    #[error("infeasible relaxation")]
    Infeasible,
    /// the solver failed (numerical trouble, internal error...)
    #[error("relaxation solver failure: {0}")]
    Solver(String),
}

/** fractional relaxation solver. Implementations must not assume anything
about the structure of the constraints, and must leave the model untouched.
*/
pub trait RelaxationSolver {
    /// solves the current relaxation (base + dynamic constraints)
    fn solve(&mut self, model:&RelaxationModel) -> Result<RelaxedSolution, OracleError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() {
        let mut model = RelaxationModel::new(3, vec![LinearConstraint::at_most_one(&[0,1])]);
        let a = model.push(ConstraintKind::Branch, "b1".to_string(), LinearConstraint::pin(0, 1.));
        let b = model.push(ConstraintKind::Cut, "c1".to_string(), LinearConstraint::at_most_one(&[1,2]));
        assert_ne!(a, b);
        assert_eq!(model.constraints().count(), 3);
        assert!(!model.pop(a)); // not on top
        assert!(model.pop(b));
        assert!(model.pop(a));
        assert_eq!(model.dynamic_len(), 0);
        // identifiers are never reused
        let c = model.push(ConstraintKind::Branch, "b2".to_string(), LinearConstraint::pin(2, 0.));
        assert!(c > b);
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let mut model = RelaxationModel::new(3, vec![]);
        {
            let mut scope = model.scope();
            scope.add(ConstraintKind::Branch, "b1".to_string(), LinearConstraint::pin(0, 1.));
            {
                let mut inner = scope.scope();
                inner.add(ConstraintKind::Cut, "c1".to_string(), LinearConstraint::at_most_one(&[1,2]));
                inner.add(ConstraintKind::Cut, "c2".to_string(), LinearConstraint::at_most_one(&[0,2]));
                assert_eq!(inner.dynamic_len(), 3);
            }
            assert_eq!(scope.dynamic_len(), 1);
            assert_eq!(scope.nb_added(), 1);
        }
        assert_eq!(model.dynamic_len(), 0);
    }

    #[test]
    fn test_scope_pops_on_early_return() {
        fn add_and_leave(model:&mut RelaxationModel, leave_early:bool) -> usize {
            let mut scope = model.scope();
            scope.add(ConstraintKind::Branch, "b".to_string(), LinearConstraint::pin(1, 0.));
            if leave_early { return scope.dynamic_len(); }
            scope.add(ConstraintKind::Cut, "c".to_string(), LinearConstraint::at_most_one(&[0,1]));
            scope.dynamic_len()
        }
        let mut model = RelaxationModel::new(2, vec![]);
        assert_eq!(add_and_leave(&mut model, true), 1);
        assert_eq!(add_and_leave(&mut model, false), 2);
        assert_eq!(model.dynamic_len(), 0);
    }

    #[test]
    fn test_lhs_value() {
        let c = LinearConstraint::at_most_one(&[0,2]);
        assert!((c.lhs_value(&[0.5, 1., 0.75]) - 1.25).abs() < 1e-12);
    }
}
