use marten_sat::{config::Config, reports::Report, solver::Solver};

mod failed_assumptions {
    use super::*;

    #[test]
    fn direct_failure() {
        let mut solver = Solver::from_config(Config::default());
        let [p] = *solver.fresh_literals(1).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p]).is_ok());

        assert_eq!(solver.check(&[-p]), Ok(Report::Unsatisfiable));
        assert_eq!(solver.core().to_vec(), vec![-p]);
    }

    #[test]
    fn failure_through_propagation() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q] = *solver.fresh_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![-p, q]).is_ok());
        assert!(solver.add_clause(vec![-q]).is_ok());

        assert_eq!(solver.check(&[p]), Ok(Report::Unsatisfiable));
        assert!(solver.core().contains(&p));
    }

    #[test]
    fn multiple_failures() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q, r, s, t, u] = *solver.fresh_literals(6).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![-p, q]).is_ok());
        assert!(solver.add_clause(vec![-r, s]).is_ok());
        assert!(solver.add_clause(vec![-s, t]).is_ok());
        assert!(solver.add_clause(vec![-q, -t]).is_ok());

        assert_eq!(solver.check(&[p, r, u]), Ok(Report::Unsatisfiable));

        assert!(solver.core().contains(&p));
        assert!(solver.core().contains(&r));
        assert!(!solver.core().contains(&u));
    }

    #[test]
    fn contradictory_assumptions() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q] = *solver.fresh_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q]).is_ok());

        assert_eq!(solver.check(&[p, -p]), Ok(Report::Unsatisfiable));
        assert!(solver.core().contains(&p) || solver.core().contains(&-p));
    }

    #[test]
    fn satisfiable_under_other_assumptions() {
        let mut solver = Solver::from_config(Config::default());
        let [p, q] = *solver.fresh_literals(2).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![p, q]).is_ok());

        assert_eq!(solver.check(&[-p]), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(q.atom()), Some(true));

        // The solver remains usable for further queries after a failed check.
        assert_eq!(solver.check(&[-q]), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(p.atom()), Some(true));
    }

    #[test]
    fn minimized_core_is_minimal() {
        let mut config = Config::default();
        config.core_minimize = true;
        let mut solver = Solver::from_config(config);
        let [a, b, c] = *solver.fresh_literals(3).as_slice() else {
            panic!("Insufficient literals");
        };

        assert!(solver.add_clause(vec![-a, -b]).is_ok());

        assert_eq!(solver.check(&[a, b, c]), Ok(Report::Unsatisfiable));

        let core = solver.core().to_vec();
        assert_eq!(core.len(), 2);
        assert!(core.contains(&a));
        assert!(core.contains(&b));

        // Removing either core literal leaves a satisfiable set of assumptions.
        assert_eq!(solver.check(&[a, c]), Ok(Report::Satisfiable));
        assert_eq!(solver.check(&[b, c]), Ok(Report::Satisfiable));
    }
}
