use std::{cell::RefCell, rc::Rc};

use marten_sat::{
    config::Config,
    extension::{ExtIndex, ExtPropagation, Extension},
    reports::Report,
    solver::Solver,
    structures::literal::CLiteral,
};

/// A one-constraint plugin: when its trigger holds, its consequence is implied.
struct Implication {
    trigger: CLiteral,
    consequence: CLiteral,
    asserted: Rc<RefCell<Vec<CLiteral>>>,
}

impl Extension for Implication {
    fn propagate(&mut self, literal: CLiteral, _index: ExtIndex) -> ExtPropagation {
        assert_eq!(literal, self.trigger);
        ExtPropagation {
            keep: true,
            implied: vec![self.consequence],
            conflict: None,
        }
    }

    fn antecedents(&mut self, literal: CLiteral, _index: ExtIndex, out: &mut Vec<CLiteral>) {
        assert_eq!(literal, self.consequence);
        out.push(-self.trigger);
    }

    fn asserted(&mut self, literal: CLiteral) {
        self.asserted.borrow_mut().push(literal);
    }
}

#[test]
fn external_propagation() {
    let mut solver = Solver::from_config(Config::default());
    let p = CLiteral::new(solver.fresh_atom(true, true), true);
    let q = CLiteral::new(solver.fresh_atom(true, true), true);

    let log = Rc::new(RefCell::new(Vec::new()));
    solver.set_extension(Box::new(Implication {
        trigger: p,
        consequence: q,
        asserted: Rc::clone(&log),
    }));
    solver.add_external_watch(p, 0);

    assert!(solver.add_clause(vec![p]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert_eq!(solver.value_of(p.atom()), Some(true));
    assert_eq!(solver.value_of(q.atom()), Some(true));

    // External assignments are notified in trail order.
    assert_eq!(*log.borrow(), vec![p, q]);
}

#[test]
fn external_conflict_is_unsatisfiable() {
    /// A plugin whose single constraint forbids its watched literal.
    struct Forbid {
        forbidden: CLiteral,
    }

    impl Extension for Forbid {
        fn propagate(&mut self, literal: CLiteral, _index: ExtIndex) -> ExtPropagation {
            assert_eq!(literal, self.forbidden);
            ExtPropagation {
                keep: true,
                implied: Vec::new(),
                conflict: Some(self.forbidden),
            }
        }

        fn antecedents(&mut self, _literal: CLiteral, _index: ExtIndex, _out: &mut Vec<CLiteral>) {
        }
    }

    let mut solver = Solver::from_config(Config::default());
    let p = CLiteral::new(solver.fresh_atom(true, true), true);

    solver.set_extension(Box::new(Forbid { forbidden: p }));
    solver.add_external_watch(p, 0);

    assert!(solver.add_clause(vec![p]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn final_check_gives_up() {
    use marten_sat::extension::ExtFinalCheck;
    use marten_sat::reports::ReasonUnknown;

    struct Undecided;

    impl Extension for Undecided {
        fn propagate(&mut self, _literal: CLiteral, _index: ExtIndex) -> ExtPropagation {
            ExtPropagation::keep()
        }

        fn antecedents(&mut self, _literal: CLiteral, _index: ExtIndex, _out: &mut Vec<CLiteral>) {
        }

        fn final_check(&mut self) -> ExtFinalCheck {
            ExtFinalCheck::GiveUp
        }
    }

    let mut solver = Solver::from_config(Config::default());
    let p = CLiteral::new(solver.fresh_atom(true, true), true);
    solver.set_extension(Box::new(Undecided));
    assert!(solver.add_clause(vec![p]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unknown(ReasonUnknown::GiveUp)));
}
