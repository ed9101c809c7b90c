use marten_sat::{config::Config, reports::Report, solver::Solver};

#[test]
fn popped_clauses_are_forgotten() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };

    solver.user_push();
    assert!(solver.add_clause(vec![p, q]).is_ok());
    assert!(solver.user_pop(1).is_ok());

    assert!(solver.add_clause(vec![-p, -q]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert!(solver.value_of(p.atom()) != Some(true) || solver.value_of(q.atom()) != Some(true));
}

#[test]
fn scoped_clauses_hold_while_open() {
    let mut solver = Solver::from_config(Config::default());
    let [p] = *solver.fresh_literals(1).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p]).is_ok());

    solver.user_push();
    assert!(solver.add_clause(vec![-p]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));

    assert!(solver.user_pop(1).is_ok());
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert_eq!(solver.value_of(p.atom()), Some(true));
}

#[test]
fn pop_restores_atom_count() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
        panic!("Insufficient literals");
    };
    assert!(solver.add_clause(vec![p, q, r]).is_ok());

    let atoms_before = solver.atom_db.atom_count();

    solver.user_push();
    assert!(solver.add_clause(vec![-p, -q, -r]).is_ok());
    assert!(solver.user_pop(1).is_ok());

    assert_eq!(solver.atom_db.atom_count(), atoms_before);
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
}

#[test]
fn nested_scopes_pop_together() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };

    solver.user_push();
    assert!(solver.add_clause(vec![p]).is_ok());

    solver.user_push();
    assert!(solver.add_clause(vec![-p, q]).is_ok());
    assert!(solver.add_clause(vec![-q]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));

    // Popping the inner scope removes the conflict; the outer clause survives.
    assert!(solver.user_pop(1).is_ok());
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert_eq!(solver.value_of(p.atom()), Some(true));

    assert!(solver.user_pop(1).is_ok());
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
}

#[test]
fn assumptions_compose_with_scopes() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };

    solver.user_push();
    assert!(solver.add_clause(vec![-p, q]).is_ok());

    assert_eq!(solver.check(&[p]), Ok(Report::Satisfiable));
    assert_eq!(solver.value_of(q.atom()), Some(true));

    assert_eq!(solver.check(&[p, -q]), Ok(Report::Unsatisfiable));
    assert!(solver.core().contains(&p) || solver.core().contains(&-q));

    assert!(solver.user_pop(1).is_ok());
    assert_eq!(solver.check(&[p, -q]), Ok(Report::Satisfiable));
}
