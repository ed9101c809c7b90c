use marten_sat::{config::Config, reports::Report, solver::Solver};

#[test]
fn empty_formula() {
    let mut solver = Solver::from_config(Config::default());
    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert!(solver.model().is_empty());
}

#[test]
fn contradictory_units() {
    let mut solver = Solver::from_config(Config::default());
    let [p] = *solver.fresh_literals(1).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p]).is_ok());
    assert!(solver.add_clause(vec![-p]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
    assert!(solver.is_inconsistent());
    assert!(solver.core().is_empty());
}

#[test]
fn forced_unsatisfiable() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p, q]).is_ok());
    assert!(solver.add_clause(vec![-p, q]).is_ok());
    assert!(solver.add_clause(vec![-q]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn forced_satisfiable() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p, q]).is_ok());
    assert!(solver.add_clause(vec![-p, q]).is_ok());
    assert!(solver.add_clause(vec![-q, r]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert_eq!(solver.value_of(q.atom()), Some(true));
    assert_eq!(solver.value_of(r.atom()), Some(true));
}

#[test]
fn exactly_one_of_three() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p, q, r]).is_ok());
    assert!(solver.add_clause(vec![-p, -q]).is_ok());
    assert!(solver.add_clause(vec![-p, -r]).is_ok());
    assert!(solver.add_clause(vec![-q, -r]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));

    let held = [p, q, r]
        .iter()
        .filter(|literal| solver.value_of(literal.atom()) == Some(true))
        .count();
    assert_eq!(held, 1);
}

#[test]
fn conflict_through_shared_consequence() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p, q]).is_ok());
    assert!(solver.add_clause(vec![-p, r]).is_ok());
    assert!(solver.add_clause(vec![-q, r]).is_ok());
    assert!(solver.add_clause(vec![-r]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn repeated_checks_agree() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p]).is_ok());
    assert!(solver.add_clause(vec![-p, q]).is_ok());
    assert!(solver.add_clause(vec![-q, r]).is_ok());

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    let first_model = solver.model().to_vec();

    assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    assert_eq!(solver.model(), first_model.as_slice());
}

#[test]
fn copy_preserves_satisfiability() {
    let mut satisfiable = Solver::from_config(Config::default());
    let [p, q] = *satisfiable.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };
    assert!(satisfiable.add_clause(vec![p, q]).is_ok());
    assert!(satisfiable.add_clause(vec![-p, q]).is_ok());
    assert_eq!(satisfiable.check(&[]), Ok(Report::Satisfiable));

    let mut copy = satisfiable.copy().expect("copy failed");
    assert_eq!(copy.check(&[]), Ok(Report::Satisfiable));

    let mut unsatisfiable = Solver::from_config(Config::default());
    let [p, q] = *unsatisfiable.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };
    assert!(unsatisfiable.add_clause(vec![p, q]).is_ok());
    assert!(unsatisfiable.add_clause(vec![-p, q]).is_ok());
    assert!(unsatisfiable.add_clause(vec![p, -q]).is_ok());
    assert!(unsatisfiable.add_clause(vec![-p, -q]).is_ok());
    assert_eq!(unsatisfiable.check(&[]), Ok(Report::Unsatisfiable));

    let mut copy = unsatisfiable.copy().expect("copy failed");
    assert_eq!(copy.check(&[]), Ok(Report::Unsatisfiable));
}

#[test]
fn dimacs_emission() {
    let mut solver = Solver::from_config(Config::default());
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };

    assert!(solver.add_clause(vec![p, q]).is_ok());
    assert!(solver.add_clause(vec![-p]).is_ok());

    let mut out = Vec::new();
    solver.write_dimacs(&mut out).expect("emission failed");
    let emitted = String::from_utf8(out).expect("emission not utf8");

    assert_eq!(emitted, "p cnf 2 2\n-1 0\n1 2 0\n");
}

#[test]
fn branching_variants_agree() {
    use marten_sat::config::Branching;

    for branching in [Branching::Vsids, Branching::Chb, Branching::Lrb] {
        let mut config = Config::default();
        config.branching = branching;
        config.anti_exploration = true;

        let mut solver = Solver::from_config(config);
        let [p, q, r] = *solver.fresh_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q, r]).is_ok());
        assert!(solver.add_clause(vec![-p, q]).is_ok());
        assert!(solver.add_clause(vec![-q, r]).is_ok());
        assert!(solver.add_clause(vec![-r, -p]).is_ok());

        assert_eq!(solver.check(&[]), Ok(Report::Satisfiable));
    }
}

#[test]
fn conflict_cap_reports_unknown() {
    use marten_sat::reports::ReasonUnknown;

    let mut config = Config::default();
    config.max_conflicts = 0;
    let mut solver = Solver::from_config(config);
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };
    assert!(solver.add_clause(vec![p, q]).is_ok());

    assert_eq!(
        solver.check(&[]),
        Ok(Report::Unknown(ReasonUnknown::MaxConflicts))
    );
}

#[test]
fn time_limit_reports_canceled() {
    use marten_sat::reports::ReasonUnknown;
    use std::time::Duration;

    let mut config = Config::default();
    config.time_limit = Some(Duration::ZERO);
    let mut solver = Solver::from_config(config);
    let [p, q] = *solver.fresh_literals(2).as_slice() else {
        panic!("Insufficient literals");
    };
    assert!(solver.add_clause(vec![p, q]).is_ok());

    assert_eq!(
        solver.check(&[]),
        Ok(Report::Unknown(ReasonUnknown::Canceled))
    );
}
